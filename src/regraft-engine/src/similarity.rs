//! Sequence similarity scoring.
//!
//! Every ratio is `2 * M / T` where `T` is the combined character count.
//! For [`SequenceScorer::ratio`], `M` is the number of characters in the
//! matching blocks of a character diff; for [`SequenceScorer::quick_ratio`]
//! it is the size of the character multiset intersection and for
//! [`SequenceScorer::real_quick_ratio`] the shorter length. Each of the
//! cheaper ratios is an upper bound of the ones before it.
//!
//! [`SequenceScorer::shingle_ratio`] compares character trigrams instead. It
//! is not a bound of anything, only a cheap way to rank many candidates
//! before the exact ratio is spent on a few of them.

use std::collections::HashMap;
use std::time::Duration;

use similar::{Algorithm, TextDiff};

/// Scores candidates against one fixed query.
#[derive(Debug, Clone)]
pub struct SequenceScorer<'q> {
    query: &'q str,
    query_len: usize,
    char_counts: HashMap<char, usize>,
    shingles: HashMap<[char; 3], usize>,
    timeout: Option<Duration>,
}

impl<'q> SequenceScorer<'q> {
    /// Precomputes the query's character profile.
    pub fn new(query: &'q str) -> Self {
        let mut char_counts = HashMap::new();
        let mut query_len = 0;
        for c in query.chars() {
            *char_counts.entry(c).or_insert(0) += 1;
            query_len += 1;
        }
        Self {
            query,
            query_len,
            char_counts,
            shingles: shingle_counts(query),
            timeout: None,
        }
    }

    /// Bound the time a single [`ratio`](Self::ratio) call may spend diffing.
    ///
    /// Past the limit the diff stops refining, so the ratio can come out
    /// lower than the exact value but never higher.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The query being scored against.
    pub fn query(&self) -> &'q str {
        self.query
    }

    /// Cheap length check: true if the candidate's character count is within
    /// `tolerance * query_len` of the query's.
    pub fn length_within(&self, candidate: &str, tolerance: f64) -> bool {
        let len = candidate.chars().count();
        (len.abs_diff(self.query_len) as f64) <= self.query_len as f64 * tolerance
    }

    /// Upper bound of [`quick_ratio`](Self::quick_ratio) from lengths alone.
    pub fn real_quick_ratio(&self, candidate: &str) -> f64 {
        let len = candidate.chars().count();
        calculate_ratio(len.min(self.query_len), len + self.query_len)
    }

    /// Upper bound of [`ratio`](Self::ratio) from character counts alone.
    pub fn quick_ratio(&self, candidate: &str) -> f64 {
        let mut avail: HashMap<char, isize> = HashMap::new();
        let mut matches = 0usize;
        let mut candidate_len = 0usize;

        for c in candidate.chars() {
            candidate_len += 1;
            let remaining = avail
                .entry(c)
                .or_insert_with(|| self.char_counts.get(&c).copied().unwrap_or(0) as isize);
            if *remaining > 0 {
                matches += 1;
            }
            *remaining -= 1;
        }

        calculate_ratio(matches, self.query_len + candidate_len)
    }

    /// Dice coefficient of the character trigram multisets.
    pub fn shingle_ratio(&self, candidate: &str) -> f64 {
        let counts = shingle_counts(candidate);
        let query_total: usize = self.shingles.values().sum();
        let candidate_total: usize = counts.values().sum();
        let shared: usize = counts
            .iter()
            .map(|(gram, n)| (*n).min(self.shingles.get(gram).copied().unwrap_or(0)))
            .sum();
        calculate_ratio(shared, query_total + candidate_total)
    }

    /// Exact similarity from a character-level diff.
    pub fn ratio(&self, candidate: &str) -> f64 {
        if self.query == candidate {
            return 1.0;
        }
        let mut config = TextDiff::configure();
        config.algorithm(Algorithm::Myers);
        if let Some(timeout) = self.timeout {
            config.timeout(timeout);
        }
        f64::from(config.diff_chars(self.query, candidate).ratio())
    }
}

fn shingle_counts(text: &str) -> HashMap<[char; 3], usize> {
    let chars: Vec<char> = text.chars().collect();
    let mut counts = HashMap::new();
    for gram in chars.windows(3) {
        *counts.entry([gram[0], gram[1], gram[2]]).or_insert(0) += 1;
    }
    counts
}

/// `2 * matches / total`, with two empty sequences counting as identical.
fn calculate_ratio(matches: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        2.0 * matches as f64 / total as f64
    }
}

/// Convenience wrapper for one-off comparisons.
pub fn ratio(a: &str, b: &str) -> f64 {
    SequenceScorer::new(a).ratio(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_and_empty() {
        assert!((ratio("hello", "hello") - 1.0).abs() < 1e-9);
        assert!((ratio("", "") - 1.0).abs() < 1e-9);
        assert!(ratio("abc", "").abs() < 1e-9);

        let scorer = SequenceScorer::new("");
        assert!((scorer.quick_ratio("") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_known_value() {
        // Matching blocks "a", "cd": M = 3, T = 8.
        let r = ratio("abcd", "acde");
        assert!((r - 0.75).abs() < 1e-6, "got {r}");
    }

    #[test]
    fn test_quick_ratio_is_upper_bound() {
        let pairs = [
            ("def foo():\n    return 1", "def foo():\n    return 2"),
            ("abcdef", "fedcba"),
            ("hello world", "world hello"),
            ("short", "a much longer candidate string"),
        ];
        for (a, b) in pairs {
            let scorer = SequenceScorer::new(a);
            let quick = scorer.quick_ratio(b);
            let exact = scorer.ratio(b);
            assert!(quick + 1e-9 >= exact, "{a:?} vs {b:?}: {quick} < {exact}");
        }
    }

    #[test]
    fn test_quick_ratio_anagram_is_one() {
        let scorer = SequenceScorer::new("abcdef");
        assert!((scorer.quick_ratio("fedcba") - 1.0).abs() < 1e-9);
        assert!(scorer.ratio("fedcba") < 1.0);
    }

    #[test]
    fn test_length_within() {
        let scorer = SequenceScorer::new("0123456789");
        assert!(scorer.length_within("01234", 0.5));
        assert!(scorer.length_within("012345678901234", 0.5));
        assert!(!scorer.length_within("0123", 0.5));
        assert!(!scorer.length_within("0123456789012345", 0.5));
    }

    #[test]
    fn test_multibyte_lengths_count_chars() {
        let scorer = SequenceScorer::new("ñññ");
        assert!(scorer.length_within("ñññ", 0.0));
        assert!((scorer.real_quick_ratio("abc") - 1.0).abs() < 1e-9);
        assert!((scorer.quick_ratio("ñññ") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_are_ordered() {
        let scorer = SequenceScorer::new("def foo():\n    return 1");
        for candidate in ["def bar():\n    return 2", "x", "completely different text here!"] {
            let real_quick = scorer.real_quick_ratio(candidate);
            let quick = scorer.quick_ratio(candidate);
            let exact = scorer.ratio(candidate);
            assert!(real_quick + 1e-9 >= quick, "{candidate:?}");
            assert!(quick + 1e-9 >= exact, "{candidate:?}");
        }
    }

    #[test]
    fn test_shingle_ratio_ranks_edits_above_unrelated_text() {
        let scorer = SequenceScorer::new("total = price * quantity");
        let edited = scorer.shingle_ratio("total = price * amount");
        let unrelated = scorer.shingle_ratio("import os, sys");
        assert!((scorer.shingle_ratio("total = price * quantity") - 1.0).abs() < 1e-9);
        assert!(edited > 0.5, "{edited}");
        assert!(unrelated < 0.1, "{unrelated}");
        // Anagrams share characters but not trigrams.
        assert!(SequenceScorer::new("abcdef").shingle_ratio("fedcba").abs() < 1e-9);
    }

    #[test]
    fn test_timeout_keeps_ratio_a_lower_bound() {
        let a: String = (0..400).map(|i| format!("line {i} of the query\n")).collect();
        let b: String = (0..400).map(|i| format!("row {} in the file\n", i * 7)).collect();
        let exact = SequenceScorer::new(&a).ratio(&b);
        let bounded = SequenceScorer::new(&a)
            .with_timeout(Duration::from_millis(1))
            .ratio(&b);
        assert!(bounded <= exact + 1e-9, "{bounded} > {exact}");
    }
}
