//! Context extraction around a located match.

use std::fs;
use std::path::{Path, PathBuf};

use regraft_corpus::decode_lossy;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::text::{advance_chars, line_of_offset, normalize_newlines, offset_of_line, retreat_chars};

/// A margin-expanded slice of a file around an exact match.
///
/// All offsets are byte offsets into the newline-normalized file text and
/// satisfy `start_offset <= match_start_offset <= match_end_offset <= end_offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBlock {
    /// The file the block was cut from.
    pub file_path: PathBuf,
    /// Text of the block, `file[start_offset..end_offset]`.
    pub full_text: String,
    /// Start of the block in the file.
    pub start_offset: usize,
    /// End of the block in the file.
    pub end_offset: usize,
    /// Start of the match in the file.
    pub match_start_offset: usize,
    /// End of the match in the file.
    pub match_end_offset: usize,
    start_line: usize,
}

impl ContextBlock {
    /// The matched text inside the block.
    pub fn matched_text(&self) -> &str {
        &self.full_text
            [self.match_start_offset - self.start_offset..self.match_end_offset - self.start_offset]
    }

    /// 1-based line of the match start within `full_text`.
    pub fn match_line_in_block(&self) -> usize {
        line_of_offset(&self.full_text, self.match_start_offset - self.start_offset)
    }

    /// 1-based line of the match start within the file.
    pub fn match_line_in_file(&self) -> usize {
        self.start_line + self.match_line_in_block() - 1
    }

    /// 1-based line where the block starts within the file.
    pub fn start_line(&self) -> usize {
        self.start_line
    }
}

/// Re-locates a match in live file content and cuts a context block around it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextExtractor;

impl ContextExtractor {
    /// Read `file_path` and extract the block around `matched_text`.
    ///
    /// Returns `Ok(None)` when the text no longer occurs in the file.
    pub fn extract(
        file_path: &Path,
        matched_text: &str,
        approximate_line: usize,
        margin: usize,
    ) -> EngineResult<Option<ContextBlock>> {
        let bytes = fs::read(file_path).map_err(|e| EngineError::read(file_path, e))?;
        let text = decode_lossy(bytes);
        let block = Self::extract_from_text(file_path, &text, matched_text, approximate_line, margin);
        if block.is_none() {
            warn!(path = %file_path.display(), "Matched text no longer found in file");
        }
        Ok(block)
    }

    /// Extract from already loaded file content.
    pub fn extract_from_text(
        file_path: &Path,
        file_text: &str,
        matched_text: &str,
        approximate_line: usize,
        margin: usize,
    ) -> Option<ContextBlock> {
        let text = normalize_newlines(file_text);
        let needle = normalize_newlines(matched_text);
        if needle.is_empty() {
            return None;
        }

        let target = offset_of_line(&text, approximate_line);
        let mut occurrences = 0usize;
        let mut best: Option<usize> = None;
        for (pos, _) in text.match_indices(needle.as_ref()) {
            occurrences += 1;
            if best.is_none_or(|b| pos.abs_diff(target) < b.abs_diff(target)) {
                best = Some(pos);
            }
        }
        let match_start = best?;
        let match_end = match_start + needle.len();

        let start = retreat_chars(&text, match_start, margin);
        let end = advance_chars(&text, match_end, margin);
        debug!(
            occurrences,
            match_start,
            block = format_args!("{start}..{end}"),
            "Extracted context block"
        );

        Some(ContextBlock {
            file_path: file_path.to_path_buf(),
            full_text: text[start..end].to_string(),
            start_offset: start,
            end_offset: end,
            match_start_offset: match_start,
            match_end_offset: match_end,
            start_line: line_of_offset(&text, start),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_offsets_invariant_and_margin() {
        let text = "0123456789MATCH0123456789";
        let block =
            ContextExtractor::extract_from_text(Path::new("/f"), text, "MATCH", 1, 3).unwrap();
        assert_eq!(block.start_offset, 7);
        assert_eq!(block.match_start_offset, 10);
        assert_eq!(block.match_end_offset, 15);
        assert_eq!(block.end_offset, 18);
        assert_eq!(block.full_text, "789MATCH012");
        assert_eq!(block.matched_text(), "MATCH");
        assert_eq!(&text[block.match_start_offset..block.match_end_offset], "MATCH");
    }

    #[test]
    fn test_margin_clipped_to_bounds() {
        let text = "ab MATCH cd";
        let block =
            ContextExtractor::extract_from_text(Path::new("/f"), text, "MATCH", 1, 500).unwrap();
        assert_eq!(block.start_offset, 0);
        assert_eq!(block.end_offset, text.len());
        assert_eq!(block.full_text, text);

        let zero =
            ContextExtractor::extract_from_text(Path::new("/f"), text, "MATCH", 1, 0).unwrap();
        assert_eq!(zero.full_text, "MATCH");
    }

    #[test]
    fn test_picks_occurrence_closest_to_line() {
        let text = "x = 1\ny = 2\nx = 1\ny = 2\nx = 1\n";
        let block = ContextExtractor::extract_from_text(Path::new("/f"), text, "x = 1", 3, 0).unwrap();
        assert_eq!(block.match_start_offset, 12);
        assert_eq!(block.match_line_in_file(), 3);

        let block = ContextExtractor::extract_from_text(Path::new("/f"), text, "x = 1", 5, 0).unwrap();
        assert_eq!(block.match_line_in_file(), 5);

        // Equidistant occurrences keep the first.
        let block = ContextExtractor::extract_from_text(Path::new("/f"), text, "x = 1", 2, 0).unwrap();
        assert_eq!(block.match_line_in_file(), 1);
    }

    #[test]
    fn test_line_helpers() {
        let text = "one\ntwo\nthree\nfour\nfive\n";
        let block = ContextExtractor::extract_from_text(Path::new("/f"), text, "four", 4, 6).unwrap();
        assert_eq!(block.full_text, "three\nfour\nfive\n");
        assert_eq!(block.start_line(), 3);
        assert_eq!(block.match_line_in_block(), 2);
        assert_eq!(block.match_line_in_file(), 4);
    }

    #[test]
    fn test_multibyte_margin_counts_chars() {
        let text = "ñññMATCH€€€";
        let block =
            ContextExtractor::extract_from_text(Path::new("/f"), text, "MATCH", 1, 2).unwrap();
        assert_eq!(block.full_text, "ññMATCH€€");
        assert_eq!(block.matched_text(), "MATCH");
    }

    #[test]
    fn test_crlf_offsets_are_normalized() {
        let text = "line one\r\nline two\r\n";
        let block =
            ContextExtractor::extract_from_text(Path::new("/f"), text, "line two", 2, 0).unwrap();
        assert_eq!(block.match_start_offset, 9);
    }

    #[test]
    fn test_stale_match_is_none() {
        assert!(
            ContextExtractor::extract_from_text(Path::new("/f"), "changed text", "original", 1, 10)
                .is_none()
        );
        assert!(ContextExtractor::extract_from_text(Path::new("/f"), "text", "", 1, 10).is_none());
    }

    #[test]
    fn test_extract_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.py");
        fs::write(&path, "def foo():\n    return 1\n").unwrap();

        let block = ContextExtractor::extract(&path, "return 1", 2, 4).unwrap().unwrap();
        assert_eq!(block.full_text, "    return 1\n");

        let missing = ContextExtractor::extract(&dir.path().join("nope.py"), "x", 1, 0);
        assert!(matches!(missing, Err(EngineError::ReadFile { .. })));
    }
}
