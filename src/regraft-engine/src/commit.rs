//! Splicing replacement text back into a file on disk.
//!
//! The committer trusts the offsets it is given: the file is re-read and
//! normalized, but the range is not re-validated against the match it came
//! from. The whole file is rewritten; no backup is taken.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use regraft_corpus::decode_lossy;
use similar::TextDiff;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::text::normalize_newlines;

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    /// The file that was rewritten.
    pub path: PathBuf,
    /// Size of the new file content.
    pub bytes_written: usize,
    /// The byte range that was replaced, in the pre-commit text.
    pub replaced_range: Range<usize>,
}

/// Writes edited text back over a byte range of a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplacementCommitter;

impl ReplacementCommitter {
    /// Replace `start..end` of the normalized file content with `new_text`
    /// and write the result back.
    pub fn commit(
        file_path: &Path,
        start: usize,
        end: usize,
        new_text: &str,
    ) -> EngineResult<CommitReport> {
        let current = read_normalized(file_path)?;
        let updated = splice(file_path, &current, start, end, new_text)?;

        fs::write(file_path, &updated).map_err(|e| EngineError::write(file_path, e))?;
        info!(
            path = %file_path.display(),
            start,
            end,
            bytes = updated.len(),
            "Committed replacement"
        );

        Ok(CommitReport {
            path: file_path.to_path_buf(),
            bytes_written: updated.len(),
            replaced_range: start..end,
        })
    }

    /// Unified diff of what [`commit`](Self::commit) would write, without
    /// touching the file.
    pub fn preview(
        file_path: &Path,
        start: usize,
        end: usize,
        new_text: &str,
    ) -> EngineResult<String> {
        let current = read_normalized(file_path)?;
        let updated = splice(file_path, &current, start, end, new_text)?;
        let name = file_path.display().to_string();

        Ok(TextDiff::from_lines(current.as_str(), updated.as_str())
            .unified_diff()
            .context_radius(3)
            .header(&name, &name)
            .to_string())
    }
}

fn read_normalized(path: &Path) -> EngineResult<String> {
    let bytes = fs::read(path).map_err(|e| EngineError::read(path, e))?;
    Ok(normalize_newlines(&decode_lossy(bytes)).into_owned())
}

/// `text[..start] + new_text + text[end..]`, checking the range first.
pub fn splice(
    path: &Path,
    text: &str,
    start: usize,
    end: usize,
    new_text: &str,
) -> EngineResult<String> {
    let reason = if start > end {
        Some("start is after end")
    } else if end > text.len() {
        Some("range extends past the end of the file")
    } else if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
        Some("offset is not on a character boundary")
    } else {
        None
    };
    if let Some(reason) = reason {
        return Err(EngineError::invalid_range(path, start, end, text.len(), reason));
    }

    let mut out = String::with_capacity(text.len() - (end - start) + new_text.len());
    out.push_str(&text[..start]);
    out.push_str(new_text);
    out.push_str(&text[end..]);
    Ok(out)
}
