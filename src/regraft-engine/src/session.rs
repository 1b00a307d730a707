//! Pipeline entry points: search, smart paste and the review session.

use std::path::Path;

use regraft_corpus::{Corpus, CorpusProvider};
use tracing::{debug, info};

use crate::commit::{CommitReport, ReplacementCommitter};
use crate::config::EngineConfig;
use crate::context::{ContextBlock, ContextExtractor};
use crate::error::EngineResult;
use crate::identify::{FileIdentifier, Identification};
use crate::locate::{MatchResult, RegionLocator};
use crate::region::{RegionReplacer, RegionReport, detect_region_name};

/// Source of the text to locate. Read once per invocation.
pub trait ClipboardSource {
    /// Current clipboard text.
    fn read_text(&self) -> EngineResult<String>;
}

impl<C: ClipboardSource + ?Sized> ClipboardSource for &C {
    fn read_text(&self) -> EngineResult<String> {
        (**self).read_text()
    }
}

impl<C: ClipboardSource + ?Sized> ClipboardSource for Box<C> {
    fn read_text(&self) -> EngineResult<String> {
        (**self).read_text()
    }
}

/// A clipboard holding fixed text, for pipes and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticClipboard {
    text: String,
}

impl StaticClipboard {
    /// Create a clipboard that always returns `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ClipboardSource for StaticClipboard {
    fn read_text(&self) -> EngineResult<String> {
        Ok(self.text.clone())
    }
}

/// State of one review: what was searched for, where it was found.
///
/// Consumed by [`commit`](Self::commit).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSession {
    /// The query as read from the clipboard.
    pub query: String,
    /// The identified source file.
    pub identification: Identification,
    /// The located region.
    pub matched: MatchResult,
}

impl SearchSession {
    /// File containing the match.
    pub fn file_path(&self) -> &Path {
        &self.matched.file_path
    }

    /// Re-read the file and cut a context block around the match.
    ///
    /// `Ok(None)` means the file changed and the match is stale.
    pub fn context(&self, margin: usize) -> EngineResult<Option<ContextBlock>> {
        ContextExtractor::extract(
            &self.matched.file_path,
            &self.matched.matched_text,
            self.matched.approximate_line,
            margin,
        )
    }

    /// Replace `block` with `edited_text` on disk, ending the session.
    pub fn commit(self, block: &ContextBlock, edited_text: &str) -> EngineResult<CommitReport> {
        ReplacementCommitter::commit(
            &block.file_path,
            block.start_offset,
            block.end_offset,
            edited_text,
        )
    }
}

/// What a smart paste did.
#[derive(Debug, Clone, PartialEq)]
pub enum PasteOutcome {
    /// The clipboard was empty.
    Empty,
    /// The clipboard declared a region and it was replaced.
    RegionReplaced {
        /// Declared region name.
        name: String,
        /// Files touched.
        report: RegionReport,
    },
    /// The clipboard declared a region that no file contains.
    RegionMissing(String),
    /// The clipboard text was located; awaiting review.
    Located(Box<SearchSession>),
    /// Nothing matched.
    NoMatch,
}

/// The identify, locate and extract pipeline.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
    identifier: FileIdentifier,
    locator: RegionLocator,
}

impl Engine {
    /// Create an engine from configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            identifier: FileIdentifier::new(config.identify.clone()),
            locator: RegionLocator::new(config.locate.clone()),
            config,
        }
    }

    /// Default context margin.
    pub fn margin(&self) -> usize {
        self.config.context.margin
    }

    /// Identify the source file of `query` and locate it there.
    pub fn search(&self, corpus: &Corpus, query: &str) -> Option<SearchSession> {
        let identification = self.identifier.identify(corpus, query)?;
        let entry = corpus.get(&identification.path)?;
        let matched = self.locator.locate(
            &entry.absolute_path,
            &entry.text,
            query,
            identification.unique_hit(),
        )?;

        if matched.confidence <= self.config.locate.min_accept_ratio {
            debug!(confidence = matched.confidence, "Match below acceptance ratio");
            return None;
        }

        info!(
            path = %matched.file_path.display(),
            line = matched.approximate_line,
            confidence = matched.confidence,
            strategy = %matched.strategy,
            "Match located"
        );
        Some(SearchSession {
            query: query.to_string(),
            identification,
            matched,
        })
    }

    /// Read the clipboard once and either replace the region it declares or
    /// locate it in the corpus.
    pub fn smart_paste<P, C>(&self, provider: &P, clipboard: &C) -> EngineResult<PasteOutcome>
    where
        P: CorpusProvider + ?Sized,
        C: ClipboardSource + ?Sized,
    {
        let text = clipboard.read_text()?;
        if text.trim().is_empty() {
            return Ok(PasteOutcome::Empty);
        }

        let corpus = provider.load()?;
        debug!(files = corpus.len(), "Corpus loaded for smart paste");

        if let Some(name) = detect_region_name(&text) {
            info!(region = %name, "Clipboard declares a region");
            let report = RegionReplacer::replace_region(&corpus, &name, &text)?;
            return Ok(if report.found() {
                PasteOutcome::RegionReplaced { name, report }
            } else {
                PasteOutcome::RegionMissing(name)
            });
        }

        Ok(match self.search(&corpus, text.trim()) {
            Some(session) => PasteOutcome::Located(Box::new(session)),
            None => PasteOutcome::NoMatch,
        })
    }
}
