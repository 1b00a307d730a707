//! Regraft Engine - locate pasted source text in a project and splice edits back.
//!
//! The pipeline runs in tiers, cheapest and most certain first:
//! - [`FileIdentifier`] narrows the corpus to one file, by a substring unique
//!   to it or, failing that, by keyword overlap
//! - [`RegionLocator`] finds the matching range inside that file
//! - [`ContextExtractor`] re-reads the file and cuts a margin around the match
//! - [`ReplacementCommitter`] writes an edited block back over that range
//!
//! [`RegionReplacer`] is the exact path: text carrying a `#region NAME` tag
//! replaces the region of the same name in every file that declares it.
//!
//! # Example
//!
//! ```no_run
//! use regraft_corpus::{CorpusConfig, ProjectCorpus};
//! use regraft_engine::{Engine, EngineConfig, PasteOutcome, StaticClipboard};
//!
//! let engine = Engine::new(EngineConfig::default());
//! let provider = ProjectCorpus::new(CorpusConfig::new("."));
//! let clipboard = StaticClipboard::new("def foo():\n    return 1");
//!
//! if let PasteOutcome::Located(session) = engine.smart_paste(&provider, &clipboard)? {
//!     if let Some(block) = session.context(engine.margin())? {
//!         let edited = block.full_text.replace("return 1", "return 2");
//!         session.commit(&block, &edited)?;
//!     }
//! }
//! # Ok::<(), regraft_engine::EngineError>(())
//! ```

#![allow(clippy::missing_errors_doc)]

mod commit;
mod config;
mod context;
mod error;
mod identify;
mod locate;
mod region;
mod session;
pub mod similarity;
pub mod text;

pub use commit::{CommitReport, ReplacementCommitter, splice};
pub use config::{
    ContextConfig, DEFAULT_MARGIN, EngineConfig, IdentifyConfig, LocateConfig, MAX_MARGIN,
    SubstringSweep,
};
pub use context::{ContextBlock, ContextExtractor};
pub use error::{EngineError, EngineResult};
pub use identify::{Evidence, FileIdentifier, Identification, UniqueHit, extract_keywords};
pub use locate::{MatchResult, RegionLocator, Strategy};
pub use region::{RegionReplacer, RegionReport, detect_region_name, region_pattern};
pub use session::{ClipboardSource, Engine, PasteOutcome, SearchSession, StaticClipboard};
