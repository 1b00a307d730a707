//! Result rendering for the terminal and for `--json`.

use std::fmt::Write as _;
use std::path::Path;

use regraft_engine::{CommitReport, ContextBlock, Evidence, RegionReport, SearchSession};
use serde::Serialize;

/// A located match with its context block.
#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    /// File the match is in.
    pub path: String,
    /// 1-based line where the match starts.
    pub line: usize,
    /// `1.0` for verbatim hits, otherwise the similarity ratio.
    pub confidence: f64,
    /// Strategy that located the match.
    pub strategy: &'static str,
    /// How the file was identified: `unique_substring` or `keyword_overlap`.
    pub identified_by: &'static str,
    /// Byte offset of the context block in the normalized file.
    pub start_offset: usize,
    /// Byte offset where the context block ends.
    pub end_offset: usize,
    /// Byte offset of the match in the normalized file.
    pub match_start_offset: usize,
    /// Byte offset where the match ends.
    pub match_end_offset: usize,
    /// 1-based line where the context block starts.
    pub first_line: usize,
    /// Text of the context block.
    pub context: String,
}

impl MatchView {
    pub fn new(session: &SearchSession, block: &ContextBlock) -> Self {
        let identified_by = match session.identification.evidence {
            Evidence::UniqueSubstring(_) => "unique_substring",
            Evidence::KeywordOverlap { .. } => "keyword_overlap",
        };
        Self {
            path: display_path(&block.file_path),
            line: block.match_line_in_file(),
            confidence: session.matched.confidence,
            strategy: session.matched.strategy.as_str(),
            identified_by,
            start_offset: block.start_offset,
            end_offset: block.end_offset,
            match_start_offset: block.match_start_offset,
            match_end_offset: block.match_end_offset,
            first_line: block.start_line(),
            context: block.full_text.clone(),
        }
    }

    /// Header line followed by the numbered context; matched lines are
    /// marked with `>`.
    pub fn render_text(&self) -> String {
        let mut out = format!(
            "{}:{}  {} ({:.2})\n",
            self.path, self.line, self.strategy, self.confidence
        );

        let match_lines = self.context
            [self.match_start_offset - self.start_offset..self.match_end_offset - self.start_offset]
            .trim_end_matches('\n')
            .matches('\n')
            .count();
        let last_match_line = self.line + match_lines;
        let width = (self.first_line + self.context.matches('\n').count())
            .to_string()
            .len();

        for (idx, text) in self.context.split('\n').enumerate() {
            let number = self.first_line + idx;
            let marker = if (self.line..=last_match_line).contains(&number) {
                '>'
            } else {
                '|'
            };
            let _ = writeln!(out, "{number:>width$} {marker} {text}");
        }
        out
    }
}

/// Files touched by a region replacement.
#[derive(Debug, Clone, Serialize)]
pub struct RegionView {
    /// Region name.
    pub region: String,
    /// Files rewritten, in corpus order.
    pub updated: Vec<String>,
    pub failed: Vec<FailedWrite>,
}

/// A file whose region could not be written.
#[derive(Debug, Clone, Serialize)]
pub struct FailedWrite {
    pub path: String,
    pub error: String,
}

impl RegionView {
    pub fn new(region: &str, report: &RegionReport) -> Self {
        Self {
            region: region.to_string(),
            updated: report.updated.iter().map(|p| display_path(p)).collect(),
            failed: report
                .failed
                .iter()
                .map(|(path, error)| FailedWrite {
                    path: display_path(path),
                    error: error.clone(),
                })
                .collect(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for path in &self.updated {
            let _ = writeln!(out, "Replaced region '{}' in {path}", self.region);
        }
        for failed in &self.failed {
            let _ = writeln!(out, "Failed to write {}: {}", failed.path, failed.error);
        }
        out
    }
}

/// A completed commit.
#[derive(Debug, Clone, Serialize)]
pub struct CommitView {
    pub path: String,
    /// Size of the rewritten file.
    pub bytes_written: usize,
    /// Start of the replaced range.
    pub start: usize,
    /// End of the replaced range, before the write.
    pub end: usize,
}

impl From<&CommitReport> for CommitView {
    fn from(report: &CommitReport) -> Self {
        Self {
            path: display_path(&report.path),
            bytes_written: report.bytes_written,
            start: report.replaced_range.start,
            end: report.replaced_range.end,
        }
    }
}

impl CommitView {
    pub fn render_text(&self) -> String {
        format!(
            "Wrote {} bytes to {} (replaced {}..{})\n",
            self.bytes_written, self.path, self.start, self.end
        )
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}
