//! File identification: narrowing a corpus down to the one file a snippet
//! most likely came from.
//!
//! Two tiers, cheapest and most certain first:
//! 1. A sweep of query substrings looking for one contained by exactly one
//!    file. The longest such substring wins.
//! 2. Keyword overlap scoring across every file.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use regraft_corpus::Corpus;
use tracing::{debug, info};

use crate::config::IdentifyConfig;
use crate::text::{char_range, normalize_newlines};

/// A query substring found verbatim in exactly one corpus file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueHit {
    /// The file containing the substring.
    pub path: PathBuf,
    /// The substring itself.
    pub substring: String,
    /// Byte offset of the substring in the normalized query.
    pub query_offset: usize,
    /// Byte offset of its first occurrence in the normalized file text.
    pub file_offset: usize,
}

impl UniqueHit {
    /// Length of the substring in characters.
    pub fn char_len(&self) -> usize {
        self.substring.chars().count()
    }
}

/// Why a file was chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum Evidence {
    /// A verbatim substring unique to this file.
    UniqueSubstring(UniqueHit),
    /// Fraction of query keywords found in the file.
    KeywordOverlap {
        /// Overlap score in `[0, 1]`.
        score: f64,
        /// Number of distinct keywords scored.
        tokens: usize,
    },
}

/// The file chosen as the likely origin of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    /// Absolute path of the chosen file.
    pub path: PathBuf,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// What the choice was based on.
    pub evidence: Evidence,
}

impl Identification {
    /// The unique substring hit, if identification used one.
    pub fn unique_hit(&self) -> Option<&UniqueHit> {
        match &self.evidence {
            Evidence::UniqueSubstring(hit) => Some(hit),
            Evidence::KeywordOverlap { .. } => None,
        }
    }
}

/// Picks the single most probable source file for a query.
#[derive(Debug, Clone, Default)]
pub struct FileIdentifier {
    config: IdentifyConfig,
}

impl FileIdentifier {
    /// Create a new identifier with the given configuration.
    pub fn new(config: IdentifyConfig) -> Self {
        Self { config }
    }

    /// Identify the file `query` most likely came from.
    ///
    /// Returns `None` for an empty corpus, a blank query, or when no file
    /// scores above the configured threshold.
    pub fn identify(&self, corpus: &Corpus, query: &str) -> Option<Identification> {
        if corpus.is_empty() || query.trim().is_empty() {
            return None;
        }

        let query = normalize_newlines(query);
        let texts: Vec<Cow<'_, str>> = corpus
            .iter()
            .map(|entry| normalize_newlines(&entry.text))
            .collect();
        let paths: Vec<&Path> = corpus.iter().map(|e| e.absolute_path.as_path()).collect();

        if let Some(hit) = self.find_unique_substring(&paths, &texts, &query) {
            info!(
                path = %hit.path.display(),
                len = hit.char_len(),
                "Identified file by unique substring"
            );
            return Some(Identification {
                path: hit.path.clone(),
                confidence: 1.0,
                evidence: Evidence::UniqueSubstring(hit),
            });
        }

        debug!("No unique substring, falling back to keyword overlap");
        self.keyword_overlap(&paths, &texts, &query)
    }

    /// Sweep query substrings of growing length and return the longest one
    /// contained by exactly one file.
    fn find_unique_substring(
        &self,
        paths: &[&Path],
        texts: &[Cow<'_, str>],
        query: &str,
    ) -> Option<UniqueHit> {
        let n = query.chars().count();
        let sweep = self.config.sweep_for(n);
        if sweep.max_len == 0 {
            return None;
        }

        let mut best: Option<(usize, UniqueHit)> = None;
        let mut len = sweep.min_len.max(1);

        loop {
            for start in sample_offsets(n, len) {
                let (begin, end) = char_range(query, start, len);
                let substring = &query[begin..end];
                if substring.trim().is_empty() {
                    continue;
                }

                let Some((file_idx, file_offset)) = sole_container(texts, substring) else {
                    continue;
                };

                // Lengths only grow, so a later hit is at least as long.
                if best.as_ref().is_none_or(|(best_len, _)| len > *best_len) {
                    debug!(len, start, file = %paths[file_idx].display(), "Unique substring hit");
                    best = Some((
                        len,
                        UniqueHit {
                            path: paths[file_idx].to_path_buf(),
                            substring: substring.to_string(),
                            query_offset: begin,
                            file_offset,
                        },
                    ));
                }
                break;
            }

            if len >= sweep.max_len {
                break;
            }
            len = (len + sweep.step).min(sweep.max_len);
        }

        best.map(|(_, hit)| hit)
    }

    /// Score every file by the fraction of query keywords it contains.
    fn keyword_overlap(
        &self,
        paths: &[&Path],
        texts: &[Cow<'_, str>],
        query: &str,
    ) -> Option<Identification> {
        let mut keywords = extract_keywords(query, self.config.keyword_min_len, self.config.max_keywords);
        if keywords.is_empty() {
            keywords = extract_keywords(
                query,
                self.config.keyword_fallback_len,
                self.config.max_keywords,
            );
        }
        if keywords.is_empty() {
            return None;
        }

        debug!(keywords = keywords.len(), "Scoring files by keyword overlap");

        let mut best_score = 0.0;
        let mut best_idx = None;

        for (idx, text) in texts.iter().enumerate() {
            let content = text.to_lowercase();
            let found = keywords.iter().filter(|k| content.contains(k.as_str())).count();
            let score = found as f64 / keywords.len() as f64;

            if score > best_score {
                best_score = score;
                best_idx = Some(idx);
            }
            if best_score >= self.config.keyword_early_exit {
                break;
            }
        }

        let idx = best_idx.filter(|_| best_score > self.config.min_keyword_score)?;
        info!(
            path = %paths[idx].display(),
            score = best_score,
            "Identified file by keyword overlap"
        );
        Some(Identification {
            path: paths[idx].to_path_buf(),
            confidence: best_score,
            evidence: Evidence::KeywordOverlap {
                score: best_score,
                tokens: keywords.len(),
            },
        })
    }
}

/// Character offsets sampled for a substring of `len` characters in a query of
/// `n` characters: start, quarter, half, three quarters, end.
fn sample_offsets(n: usize, len: usize) -> Vec<usize> {
    let span = n.saturating_sub(len);
    let mut offsets = vec![0, span / 4, span / 2, span * 3 / 4, span];
    offsets.dedup();
    offsets
}

/// Index and first offset of the only text containing `needle`, or `None`
/// when zero or several texts contain it.
fn sole_container(texts: &[Cow<'_, str>], needle: &str) -> Option<(usize, usize)> {
    let mut found = None;
    for (idx, text) in texts.iter().enumerate() {
        if let Some(offset) = text.find(needle) {
            if found.is_some() {
                return None;
            }
            found = Some((idx, offset));
        }
    }
    found
}

/// Lowercased word tokens of at least `min_len` characters, longest first,
/// deduplicated, capped at `limit`.
pub fn extract_keywords(text: &str, min_len: usize, limit: usize) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut tokens: Vec<&str> = lower
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= min_len)
        .collect();
    // Stable: equal lengths keep their order of appearance.
    tokens.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

    let mut keywords: Vec<String> = Vec::new();
    for token in tokens {
        if keywords.len() >= limit {
            break;
        }
        if !keywords.iter().any(|k| k == token) {
            keywords.push(token.to_string());
        }
    }
    keywords
}
