#![allow(clippy::missing_errors_doc)]
//! Regraft Corpus - candidate file discovery for clipboard relocation.
//!
//! A corpus is an ordered snapshot of `(absolute_path, text)` pairs taken at
//! search time. Nothing is cached between searches: every call to
//! [`CorpusProvider::load`] re-reads the files from disk.
//!
//! # Example
//!
//! ```no_run
//! use regraft_corpus::{CorpusConfig, CorpusProvider, ProjectCorpus};
//!
//! let provider = ProjectCorpus::new(CorpusConfig::new("/path/to/project"));
//! let corpus = provider.load()?;
//! for entry in corpus.iter() {
//!     println!("{} ({} bytes)", entry.absolute_path.display(), entry.text.len());
//! }
//! # Ok::<(), regraft_corpus::CorpusError>(())
//! ```

mod config;
mod corpus;
mod error;
mod provider;

pub use config::{CorpusConfig, CorpusConfigBuilder, DEFAULT_CODE_EXTENSIONS, DEFAULT_EXCLUDE_DIRS};
pub use corpus::{Corpus, CorpusEntry, decode_lossy, read_entry};
pub use error::{CorpusError, CorpusResult};
pub use provider::{CorpusProvider, FallbackCorpus, FileListCorpus, ProjectCorpus};
