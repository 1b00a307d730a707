//! Engine tuning knobs.
//!
//! All sections deserialize with `#[serde(default)]`, so a partial
//! configuration file only overrides the keys it names.

use std::time::Duration;

use serde::Deserialize;

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// File identification settings.
    pub identify: IdentifyConfig,
    /// Region location settings.
    pub locate: LocateConfig,
    /// Context extraction settings.
    pub context: ContextConfig,
}

/// Configuration for the file identifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentifyConfig {
    /// Overrides the adapted minimum substring length (characters).
    pub min_substring_len: Option<usize>,
    /// Overrides the adapted maximum substring length (characters).
    pub max_substring_len: Option<usize>,
    /// Overrides the adapted substring length step (characters).
    pub substring_step: Option<usize>,
    /// Minimum keyword length for the overlap fallback.
    pub keyword_min_len: usize,
    /// Keyword length used when no keyword reaches `keyword_min_len`.
    pub keyword_fallback_len: usize,
    /// Maximum number of distinct keywords scored.
    pub max_keywords: usize,
    /// Stop scanning files once a file reaches this overlap score.
    pub keyword_early_exit: f64,
    /// The best keyword score must exceed this to identify a file.
    pub min_keyword_score: f64,
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            min_substring_len: None,
            max_substring_len: None,
            substring_step: None,
            keyword_min_len: 5,
            keyword_fallback_len: 3,
            max_keywords: 50,
            keyword_early_exit: 0.9,
            min_keyword_score: 0.0,
        }
    }
}

/// Length sweep used by the unique-substring scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubstringSweep {
    /// Shortest substring tried.
    pub min_len: usize,
    /// Longest substring tried.
    pub max_len: usize,
    /// Length increment between attempts.
    pub step: usize,
}

/// Longest substring the sweep ever tries.
const SWEEP_MAX_LEN: usize = 512;

impl IdentifyConfig {
    /// Sweep parameters for a query of `query_len` characters.
    ///
    /// Shorter queries use a smaller minimum length and step.
    pub fn sweep_for(&self, query_len: usize) -> SubstringSweep {
        let (min_len, step) = if query_len <= 80 {
            (8, 4)
        } else if query_len <= 400 {
            (16, 8)
        } else {
            (32, 16)
        };

        let max_len = self
            .max_substring_len
            .unwrap_or(SWEEP_MAX_LEN)
            .min(query_len);
        let min_len = self.min_substring_len.unwrap_or(min_len).min(max_len);
        let step = self.substring_step.unwrap_or(step).max(1);

        SubstringSweep {
            min_len,
            max_len,
            step,
        }
    }
}

/// Configuration for the region locator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocateConfig {
    /// Fixed sliding-window step; `None` or `Some(0)` adapts to the input.
    pub step: Option<usize>,
    /// Query lines must be longer than this (trimmed) to serve as anchors.
    pub anchor_min_len: usize,
    /// Number of anchor lines tried.
    pub anchor_count: usize,
    /// Lines an anchor window may start below its aligned position.
    pub anchor_margin: usize,
    /// An anchor window is accepted when its ratio exceeds this.
    pub anchor_accept_ratio: f64,
    /// Windows whose length differs by more than this fraction are skipped.
    pub length_tolerance: f64,
    /// Windows whose quick ratio is below this are skipped.
    pub quick_ratio_floor: f64,
    /// The sliding scan stops at the first window reaching this ratio.
    pub early_exit_ratio: f64,
    /// A match is reported only when its confidence exceeds this.
    pub min_accept_ratio: f64,
    /// Sliding windows ranked best by trigram overlap that get an exact
    /// similarity score.
    pub refine_limit: usize,
    /// Time limit for one exact similarity score, in milliseconds.
    pub ratio_timeout_ms: u64,
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self {
            step: None,
            anchor_min_len: 10,
            anchor_count: 3,
            anchor_margin: 2,
            anchor_accept_ratio: 0.6,
            length_tolerance: 0.5,
            quick_ratio_floor: 0.5,
            early_exit_ratio: 0.95,
            min_accept_ratio: 0.1,
            refine_limit: 16,
            ratio_timeout_ms: 100,
        }
    }
}

impl LocateConfig {
    /// Stricter variant that only short-circuits on near-identical windows.
    pub fn strict() -> Self {
        Self {
            early_exit_ratio: 0.98,
            ..Default::default()
        }
    }

    /// Time limit for one exact similarity score.
    pub fn ratio_timeout(&self) -> Duration {
        Duration::from_millis(self.ratio_timeout_ms)
    }

    /// Sliding-window step for a file of `file_lines` lines and a query of
    /// `query_lines` lines.
    pub fn step_for(&self, file_lines: usize, query_lines: usize) -> usize {
        match self.step {
            Some(step) if step > 0 => step,
            _ if file_lines < 1000 => 1,
            _ if query_lines > 50 => 5,
            _ => 2,
        }
    }
}

/// Default characters of context shown around a match.
pub const DEFAULT_MARGIN: usize = 500;

/// Largest margin front ends should offer.
pub const MAX_MARGIN: usize = 5000;

/// Configuration for context extraction.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Characters of context before and after the match.
    pub margin: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_adapts_to_query_length() {
        let config = IdentifyConfig::default();

        let short = config.sweep_for(40);
        assert_eq!(short, SubstringSweep { min_len: 8, max_len: 40, step: 4 });

        let medium = config.sweep_for(300);
        assert_eq!(medium, SubstringSweep { min_len: 16, max_len: 300, step: 8 });

        let long = config.sweep_for(5000);
        assert_eq!(long, SubstringSweep { min_len: 32, max_len: 512, step: 16 });
    }

    #[test]
    fn test_sweep_tiny_query_clamps_min() {
        let sweep = IdentifyConfig::default().sweep_for(5);
        assert_eq!(sweep.min_len, 5);
        assert_eq!(sweep.max_len, 5);
    }

    #[test]
    fn test_sweep_overrides() {
        let config = IdentifyConfig {
            min_substring_len: Some(20),
            max_substring_len: Some(60),
            substring_step: Some(0),
            ..Default::default()
        };
        let sweep = config.sweep_for(1000);
        assert_eq!(sweep, SubstringSweep { min_len: 20, max_len: 60, step: 1 });
    }

    #[test]
    fn test_step_for() {
        let config = LocateConfig::default();
        assert_eq!(config.step_for(999, 100), 1);
        assert_eq!(config.step_for(5000, 60), 5);
        assert_eq!(config.step_for(5000, 30), 2);
        assert_eq!(config.step_for(5000, 5), 2);

        let fixed = LocateConfig {
            step: Some(3),
            ..Default::default()
        };
        assert_eq!(fixed.step_for(10, 10), 3);

        let zero = LocateConfig {
            step: Some(0),
            ..Default::default()
        };
        assert_eq!(zero.step_for(10, 10), 1);
    }

    #[test]
    fn test_strict_variant() {
        let strict = LocateConfig::strict();
        assert!((strict.early_exit_ratio - 0.98).abs() < 1e-9);
        assert!((strict.anchor_accept_ratio - 0.6).abs() < 1e-9);
    }
}
