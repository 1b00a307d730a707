//! Error types for corpus loading.

use std::path::PathBuf;

/// Result type alias for corpus operations.
pub type CorpusResult<T> = std::result::Result<T, CorpusError>;

/// Errors that can occur while building a corpus.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// The specified root directory does not exist.
    #[error("Root directory does not exist: {0}")]
    RootNotFound(PathBuf),

    /// The specified root is not a directory.
    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error during traversal.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CorpusError {
    /// Creates a new `RootNotFound` error.
    pub fn root_not_found(path: impl Into<PathBuf>) -> Self {
        Self::RootNotFound(path.into())
    }

    /// Creates a new `NotADirectory` error.
    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Creates a new `ReadFile` error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }
}
