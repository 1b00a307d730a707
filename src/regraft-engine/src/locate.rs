//! Region location inside a single identified file.
//!
//! Strategies are tried in order of certainty and the first one that
//! produces a result wins:
//! 1. the query appears verbatim (optionally aligned by an identification hint),
//! 2. exact anchor lines position a window that is then scored,
//! 3. a sliding window is scored across the whole file.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::LocateConfig;
use crate::identify::UniqueHit;
use crate::similarity::SequenceScorer;
use crate::text::{line_of_offset, normalize_newlines, split_lines};

/// How a match was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The query was found verbatim.
    UniqueSubstring,
    /// A window positioned by an exact anchor line.
    Anchor,
    /// The best window of a fuzzy scan.
    SlidingWindow,
}

impl Strategy {
    /// Stable lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UniqueSubstring => "unique_substring",
            Self::Anchor => "anchor",
            Self::SlidingWindow => "sliding_window",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A located region.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// The file text that matched, verbatim from the normalized file.
    pub matched_text: String,
    /// The file the match is in.
    pub file_path: PathBuf,
    /// `1.0` for verbatim hits, otherwise the similarity ratio.
    pub confidence: f64,
    /// 1-based line where the match starts.
    pub approximate_line: usize,
    /// Strategy that produced the match.
    pub strategy: Strategy,
}

/// A scored candidate window.
#[derive(Debug, Clone, Copy)]
struct Window {
    start: usize,
    end: usize,
    line: usize,
    ratio: f64,
}

/// Line table of the normalized file text.
struct Lines<'a> {
    text: &'a str,
    lines: Vec<&'a str>,
    starts: Vec<usize>,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        let lines = split_lines(text);
        let mut starts = Vec::with_capacity(lines.len());
        let mut offset = 0;
        for line in &lines {
            starts.push(offset);
            offset += line.len() + 1;
        }
        Self {
            text,
            lines,
            starts,
        }
    }

    fn len(&self) -> usize {
        self.lines.len()
    }

    /// Byte range covering lines `first..first + count` (0-based), without the
    /// trailing newline. `count` is clamped to the end of the file.
    fn span(&self, first: usize, count: usize) -> Option<(usize, usize)> {
        if first >= self.len() || count == 0 {
            return None;
        }
        let last = (first + count).min(self.len()) - 1;
        Some((self.starts[first], self.starts[last] + self.lines[last].len()))
    }

    fn slice(&self, range: (usize, usize)) -> &'a str {
        &self.text[range.0..range.1]
    }
}

/// Finds the region of a file that best matches a query.
#[derive(Debug, Clone, Default)]
pub struct RegionLocator {
    config: LocateConfig,
}

impl RegionLocator {
    /// Create a new locator with the given configuration.
    pub fn new(config: LocateConfig) -> Self {
        Self { config }
    }

    /// Locate `query` inside `file_text`.
    ///
    /// `hint` is the unique substring found during identification; it is
    /// ignored unless it refers to `file_path`. Fuzzy matches span as many
    /// lines as the query.
    pub fn locate(
        &self,
        file_path: &Path,
        file_text: &str,
        query: &str,
        hint: Option<&UniqueHit>,
    ) -> Option<MatchResult> {
        let text = normalize_newlines(file_text);
        let query = normalize_newlines(query);
        if text.is_empty() || query.trim().is_empty() {
            return None;
        }
        let hint = hint.filter(|h| h.path == file_path);

        if let Some(offset) = find_verbatim(&text, &query, hint) {
            let line = line_of_offset(&text, offset);
            debug!(line, "Query found verbatim");
            return Some(MatchResult {
                matched_text: query.into_owned(),
                file_path: file_path.to_path_buf(),
                confidence: 1.0,
                approximate_line: line,
                strategy: Strategy::UniqueSubstring,
            });
        }

        let query: &str = query.strip_suffix('\n').unwrap_or(query.as_ref());
        let lines = Lines::new(&text);
        let scorer = SequenceScorer::new(query).with_timeout(self.config.ratio_timeout());
        let query_lines = split_lines(query);

        let (window, strategy) =
            match self.anchor_window(&lines, &scorer, &query_lines, hint) {
                Some(window) => (window, Strategy::Anchor),
                None => (
                    self.sliding_window(&lines, &scorer, query_lines.len())?,
                    Strategy::SlidingWindow,
                ),
            };

        debug!(%strategy, line = window.line, ratio = window.ratio, "Region located");
        Some(MatchResult {
            matched_text: lines.slice((window.start, window.end)).to_string(),
            file_path: file_path.to_path_buf(),
            confidence: window.ratio,
            approximate_line: window.line,
            strategy,
        })
    }

    /// Score windows positioned by exact anchor lines; the best one above the
    /// acceptance ratio wins.
    ///
    /// An anchor fixes where the query would start if no lines were added or
    /// removed around it. The start is allowed to slide down by
    /// `anchor_margin` lines, but every scored window is exactly as long as
    /// the query.
    fn anchor_window(
        &self,
        lines: &Lines<'_>,
        scorer: &SequenceScorer<'_>,
        query_lines: &[&str],
        hint: Option<&UniqueHit>,
    ) -> Option<Window> {
        // (0-based line in the file, 0-based line in the query)
        let mut positions: Vec<(usize, usize)> = Vec::new();

        if let Some(hit) = hint {
            positions.push((
                line_of_offset(lines.text, hit.file_offset) - 1,
                line_of_offset(scorer.query(), hit.query_offset) - 1,
            ));
        }

        for (query_idx, anchor) in select_anchors(query_lines, &self.config) {
            if let Some(pos) = lines.text.find(anchor) {
                positions.push((line_of_offset(lines.text, pos) - 1, query_idx));
            } else {
                debug!(anchor, "Anchor line not found");
            }
        }

        let accept = self.config.anchor_accept_ratio;
        let mut scored: Vec<usize> = Vec::new();
        let mut best: Option<Window> = None;

        for (file_line, query_idx) in positions {
            let aligned = file_line.saturating_sub(query_idx);
            for first in aligned..=aligned + self.config.anchor_margin {
                if scored.contains(&first) {
                    continue;
                }
                scored.push(first);

                let Some(range) = lines.span(first, query_lines.len()) else {
                    break;
                };
                let candidate = lines.slice(range);
                if scorer.real_quick_ratio(candidate) <= accept
                    || scorer.quick_ratio(candidate) <= accept
                {
                    continue;
                }
                let ratio = scorer.ratio(candidate);
                debug!(line = first + 1, ratio, "Scored anchor window");
                if ratio > accept && best.is_none_or(|b| ratio > b.ratio) {
                    best = Some(Window {
                        start: range.0,
                        end: range.1,
                        line: first + 1,
                        ratio,
                    });
                }
            }
        }

        best
    }

    /// Scan the file with a window the size of the query.
    ///
    /// Windows are scored exactly in file order and the scan stops at the
    /// first one reaching `early_exit_ratio`.
    fn sliding_window(
        &self,
        lines: &Lines<'_>,
        scorer: &SequenceScorer<'_>,
        query_line_count: usize,
    ) -> Option<Window> {
        let shortlist = self.shortlist(lines, scorer, query_line_count);
        let mut best: Option<Window> = None;

        for &(first, range) in &shortlist {
            let ratio = scorer.ratio(lines.slice(range));
            if best.is_none_or(|b| ratio > b.ratio) {
                best = Some(Window {
                    start: range.0,
                    end: range.1,
                    line: first + 1,
                    ratio,
                });
            }
            if ratio >= self.config.early_exit_ratio {
                debug!(line = first + 1, ratio, "Sliding window short-circuit");
                break;
            }
        }

        best.filter(|w| w.ratio > self.config.min_accept_ratio)
    }

    /// Windows worth an exact score, as `(first line, byte range)` in file
    /// order.
    ///
    /// Candidates must pass the length and character-count bounds; of
    /// those, only the `refine_limit` with the most trigram overlap are kept.
    fn shortlist(
        &self,
        lines: &Lines<'_>,
        scorer: &SequenceScorer<'_>,
        query_line_count: usize,
    ) -> Vec<(usize, (usize, usize))> {
        let step = self.config.step_for(lines.len(), query_line_count);
        let last = lines.len().saturating_sub(query_line_count);
        let floor = self.config.quick_ratio_floor;
        let mut ranked: Vec<(f64, usize, (usize, usize))> = Vec::new();

        for first in (0..=last).step_by(step) {
            let Some(range) = lines.span(first, query_line_count) else {
                continue;
            };
            let candidate = lines.slice(range);
            if !scorer.length_within(candidate, self.config.length_tolerance)
                || scorer.quick_ratio(candidate) < floor
            {
                continue;
            }
            ranked.push((scorer.shingle_ratio(candidate), first, range));
        }

        let passed = ranked.len();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        ranked.truncate(self.config.refine_limit.max(1));
        ranked.sort_by_key(|&(_, first, _)| first);
        debug!(step, passed, kept = ranked.len(), "Sliding window shortlist");

        ranked
            .into_iter()
            .map(|(_, first, range)| (first, range))
            .collect()
    }
}

/// Offset of a verbatim occurrence of `query`, preferring the position the
/// hint aligns to, otherwise the first occurrence.
fn find_verbatim(text: &str, query: &str, hint: Option<&UniqueHit>) -> Option<usize> {
    let aligned = hint
        .and_then(|h| h.file_offset.checked_sub(h.query_offset))
        .filter(|&start| text.get(start..).is_some_and(|rest| rest.starts_with(query)));
    aligned.or_else(|| text.find(query))
}

/// Distinctive query lines to search for literally, longest first, paired with
/// their 0-based line index in the query.
fn select_anchors<'q>(query_lines: &[&'q str], config: &LocateConfig) -> Vec<(usize, &'q str)> {
    let mut anchors: Vec<(usize, &'q str)> = Vec::new();
    for (idx, line) in query_lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.chars().count() > config.anchor_min_len
            && !anchors.iter().any(|(_, a)| *a == trimmed)
        {
            anchors.push((idx, trimmed));
        }
    }
    anchors.sort_by(|a, b| b.1.chars().count().cmp(&a.1.chars().count()));
    anchors.truncate(config.anchor_count);
    anchors
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::{Duration, Instant};

    fn numbered_file(count: usize) -> String {
        (1..=count)
            .map(|i| format!("    value_{i:03} = compute_something_for({i}) + offset\n"))
            .collect()
    }

    #[test]
    fn test_verbatim_whole_file() {
        let text = "def foo():\n    return 1\n";
        let result = RegionLocator::default()
            .locate(Path::new("/p/a.py"), text, text, None)
            .unwrap();
        assert_eq!(result.strategy, Strategy::UniqueSubstring);
        assert_eq!(result.approximate_line, 1);
        assert_eq!(result.matched_text, text);
        assert!((result.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_verbatim_line_number() {
        let text = "import os\n\ndef foo():\n    return 1\n";
        let result = RegionLocator::default()
            .locate(Path::new("/p/a.py"), text, "def foo():\n    return 1", None)
            .unwrap();
        assert_eq!(result.approximate_line, 3);
    }

    #[test]
    fn test_hint_prefers_aligned_occurrence() {
        let text = "block()\nmarker_one\nblock()\nmarker_two\n";
        let query = "block()\nmarker_two";
        // The whole query only occurs once anyway, but the hint pins it.
        let hint = UniqueHit {
            path: PathBuf::from("/p/a.txt"),
            substring: "marker_two".to_string(),
            query_offset: 8,
            file_offset: 27,
        };
        let result = RegionLocator::default()
            .locate(Path::new("/p/a.txt"), text, query, Some(&hint))
            .unwrap();
        assert_eq!(result.approximate_line, 3);

        let repeated = "same\nsame\n";
        let hint = UniqueHit {
            path: PathBuf::from("/p/b.txt"),
            substring: "same".to_string(),
            query_offset: 0,
            file_offset: 5,
        };
        let result = RegionLocator::default()
            .locate(Path::new("/p/b.txt"), repeated, "same", Some(&hint))
            .unwrap();
        assert_eq!(result.approximate_line, 2);
    }

    #[test]
    fn test_anchor_strategy_on_edited_block() {
        let text = numbered_file(40);
        let lines: Vec<&str> = text.lines().collect();
        // Lines 10..=13 with a small edit on one of them.
        let query = format!(
            "{}\n{}\n{}\n{}",
            lines[9],
            lines[10].replace("offset", "delta"),
            lines[11],
            lines[12]
        );

        let result = RegionLocator::default()
            .locate(Path::new("/p/a.py"), &text, &query, None)
            .unwrap();
        assert_eq!(result.strategy, Strategy::Anchor);
        assert_eq!(result.approximate_line, 10);
        assert!(result.confidence > 0.6);
        assert!(text.contains(&result.matched_text));
        assert_eq!(result.matched_text.lines().count(), 4);
    }

    #[test]
    fn test_anchor_match_spans_only_query_lines() {
        let text = "def total(items, discount):\n\
                    \x20   subtotal = sum(items)\n\
                    \x20   discount_value = subtotal * discount\n\
                    \x20   shipping_fee = compute_shipping(items)\n\
                    \x20   return subtotal - discount_value * 2 + shipping_fee\n\
                    keep_me_one = 6\n\
                    keep_me_two = 7\n\
                    tail = 8\n";
        let query = "    discount_value = subtotal * discount\n\
                     \x20   shipping_fee = compute_shipping(items)\n\
                     \x20   return subtotal - discount_value * 3 + shipping_fee";

        let result = RegionLocator::default()
            .locate(Path::new("/p/cart.py"), text, query, None)
            .unwrap();
        assert_eq!(result.strategy, Strategy::Anchor);
        assert_eq!(result.approximate_line, 3);
        assert_eq!(result.matched_text.lines().count(), 3);
        assert!(result.matched_text.ends_with("* 2 + shipping_fee"));
        assert!(!result.matched_text.contains("keep_me_one"));
    }

    #[test]
    fn test_sliding_window_without_anchors() {
        let text = "a = 1\nb = 2\nc = 3\nd = 4\ne = 5\nf = 6\n";
        let query = "c = 3\nd = 9\ne = 5";
        let result = RegionLocator::default()
            .locate(Path::new("/p/a.py"), text, query, None)
            .unwrap();
        assert_eq!(result.strategy, Strategy::SlidingWindow);
        assert_eq!(result.approximate_line, 3);
        assert_eq!(result.matched_text, "c = 3\nd = 4\ne = 5");
    }

    /// Replace the characters at `positions` with `Q`.
    fn substitute(text: &str, positions: &[usize]) -> String {
        text.chars()
            .enumerate()
            .map(|(i, c)| if positions.contains(&i) { 'Q' } else { c })
            .collect()
    }

    #[test]
    fn test_sliding_window_stops_at_first_good_enough_window() {
        let query = (0..10)
            .map(|i| format!("segment{i:02}"))
            .collect::<Vec<_>>()
            .join(" ");
        // 95 of 99 characters survive, then 98 of 99.
        let close = substitute(&query, &[5, 25, 45, 65]);
        let closer = substitute(&query, &[50]);
        let text: String = (1..=20)
            .map(|line| match line {
                5 => format!("{close}\n"),
                14 => format!("{closer}\n"),
                _ => format!("x = {line}\n"),
            })
            .collect();

        let default = RegionLocator::new(LocateConfig {
            anchor_count: 0,
            ..LocateConfig::default()
        });
        let result = default
            .locate(Path::new("/p/a.txt"), &text, &query, None)
            .unwrap();
        assert_eq!(result.strategy, Strategy::SlidingWindow);
        assert_eq!(result.approximate_line, 5);
        assert_eq!(result.matched_text, close);
        assert!(result.confidence >= 0.95 && result.confidence < 0.98);

        let strict = RegionLocator::new(LocateConfig {
            anchor_count: 0,
            ..LocateConfig::strict()
        });
        let result = strict
            .locate(Path::new("/p/a.txt"), &text, &query, None)
            .unwrap();
        assert_eq!(result.approximate_line, 14);
        assert_eq!(result.matched_text, closer);
    }

    #[test]
    fn test_unrelated_query_on_large_file_is_bounded() {
        let text: String = (0..990)
            .map(|i| format!("    let value_{i} = compute(input_{i}, {i} * factor);\n"))
            .collect();
        let query: String = (0..40)
            .map(|i| format!("SELECT column_{i}, other FROM table_{i} WHERE id = {i};\n"))
            .collect();

        let locator = RegionLocator::default();
        let lines = Lines::new(&text);
        let scorer = SequenceScorer::new(&query).with_timeout(locator.config.ratio_timeout());
        let shortlist = locator.shortlist(&lines, &scorer, 40);
        assert!(shortlist.len() <= locator.config.refine_limit);
        assert!(shortlist.windows(2).all(|pair| pair[0].0 < pair[1].0));

        let started = Instant::now();
        let result = locator.locate(Path::new("/p/big.rs"), &text, &query, None);
        assert!(started.elapsed() < Duration::from_secs(30));
        if let Some(result) = result {
            assert_eq!(result.matched_text.lines().count(), 40);
        }
    }

    #[test]
    fn test_no_match_below_threshold() {
        let text = "aaaa\nbbbb\ncccc\n";
        let query = "zzzz\nyyyy";
        assert!(
            RegionLocator::default()
                .locate(Path::new("/p/a.txt"), text, query, None)
                .is_none()
        );
    }

    #[test]
    fn test_empty_inputs() {
        let locator = RegionLocator::default();
        assert!(locator.locate(Path::new("/p/a"), "", "query", None).is_none());
        assert!(locator.locate(Path::new("/p/a"), "text", "", None).is_none());
    }

    #[test]
    fn test_crlf_file_matches_lf_query() {
        let text = "one\r\ntwo\r\nthree\r\n";
        let result = RegionLocator::default()
            .locate(Path::new("/p/a.txt"), text, "two\nthree", None)
            .unwrap();
        assert_eq!(result.approximate_line, 2);
        assert_eq!(result.strategy, Strategy::UniqueSubstring);
    }

    #[test]
    fn test_select_anchors() {
        let query = ["short", "a much longer anchor line", "medium length", "a much longer anchor line", "x"];
        let config = LocateConfig::default();
        let anchors = select_anchors(&query, &config);
        assert_eq!(
            anchors,
            vec![(1, "a much longer anchor line"), (2, "medium length")]
        );
    }
}
