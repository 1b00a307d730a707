//! Text normalization and offset arithmetic.
//!
//! Every offset the engine exposes is a byte offset into newline-normalized
//! text and lies on a UTF-8 character boundary.

use std::borrow::Cow;

/// Unifies `\r\n` line endings to `\n`.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains("\r\n") {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// 1-based line number of `offset`: the count of `\n` before it, plus one.
pub fn line_of_offset(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Byte offset where the 1-based `line` starts.
///
/// Lines past the end clamp to the text length; line 0 and 1 both map to 0.
pub fn offset_of_line(text: &str, line: usize) -> usize {
    text.split('\n')
        .take(line.saturating_sub(1))
        .map(|l| l.len() + 1)
        .sum::<usize>()
        .min(text.len())
}

/// Byte offset `n` characters after `from`, clamped to the end.
pub fn advance_chars(text: &str, from: usize, n: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(n)
        .map_or(text.len(), |(i, _)| from + i)
}

/// Byte offset `n` characters before `from`, clamped to the start.
pub fn retreat_chars(text: &str, from: usize, n: usize) -> usize {
    if n == 0 {
        return from;
    }
    text[..from]
        .char_indices()
        .rev()
        .nth(n - 1)
        .map_or(0, |(i, _)| i)
}

/// Byte range of the `len` characters starting at character index `start`.
pub fn char_range(text: &str, start: usize, len: usize) -> (usize, usize) {
    let begin = advance_chars(text, 0, start);
    let end = advance_chars(text, begin, len);
    (begin, end)
}

/// Splits into lines the way the matcher windows over them: on `\n` only,
/// keeping a trailing empty line when the text ends with a newline.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}
