//! Error types for engine operations.
//!
//! "No match" outcomes are not errors: identification, location and stale
//! context extraction report them as `None`. Errors are reserved for I/O
//! failures and invalid caller input.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while extracting, committing or replacing text.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Failed to read a file.
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("Failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The splice range does not fit the current file content.
    #[error("Invalid range {start}..{end} for {path} ({len} bytes): {reason}")]
    InvalidRange {
        path: PathBuf,
        start: usize,
        end: usize,
        len: usize,
        reason: &'static str,
    },

    /// Region names must contain at least one non-whitespace character.
    #[error("Region name cannot be empty")]
    EmptyRegionName,

    /// Failed to build a region pattern.
    #[error("Invalid region pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Failed to read the clipboard.
    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    /// Failed to load the corpus.
    #[error(transparent)]
    Corpus(#[from] regraft_corpus::CorpusError),
}

impl EngineError {
    /// Create a read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid range error.
    pub fn invalid_range(
        path: impl Into<PathBuf>,
        start: usize,
        end: usize,
        len: usize,
        reason: &'static str,
    ) -> Self {
        Self::InvalidRange {
            path: path.into(),
            start,
            end,
            len,
            reason,
        }
    }

    /// Create a clipboard error.
    pub fn clipboard(message: impl Into<String>) -> Self {
        Self::Clipboard(message.into())
    }
}
