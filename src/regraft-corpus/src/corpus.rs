//! Corpus snapshot types.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::error::{CorpusError, CorpusResult};

/// A single candidate file captured at search time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    /// Absolute path of the file.
    pub absolute_path: PathBuf,

    /// Full file text, decoded lossily from UTF-8.
    pub text: String,
}

impl CorpusEntry {
    /// Creates a new entry.
    pub fn new(absolute_path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            absolute_path: absolute_path.into(),
            text: text.into(),
        }
    }

    /// Returns the file name component, or the whole path if there is none.
    pub fn file_name(&self) -> Cow<'_, str> {
        self.absolute_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| self.absolute_path.to_string_lossy())
    }

    /// Returns `parent_dir/file_name`, the short form shown to users.
    pub fn short_path(&self) -> String {
        short_path(&self.absolute_path)
    }
}

/// Returns `parent_dir/file_name` for display.
pub(crate) fn short_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path
        .parent()
        .and_then(Path::file_name)
        .map(|p| p.to_string_lossy())
    {
        Some(parent) => format!("{parent}/{file_name}"),
        None => file_name,
    }
}

/// An ordered set of candidate files.
///
/// Order is discovery order and acts as the tie-break for every
/// "first encountered" rule downstream.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
}

impl Corpus {
    /// Creates an empty corpus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a corpus from already-loaded entries.
    pub fn from_entries(entries: impl IntoIterator<Item = CorpusEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: CorpusEntry) {
        self.entries.push(entry);
    }

    /// Number of files in the corpus.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no files.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, CorpusEntry> {
        self.entries.iter()
    }

    /// Looks up an entry by absolute path.
    pub fn get(&self, path: &Path) -> Option<&CorpusEntry> {
        self.entries.iter().find(|e| e.absolute_path == path)
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a CorpusEntry;
    type IntoIter = std::slice::Iter<'a, CorpusEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<CorpusEntry> for Corpus {
    fn from_iter<I: IntoIterator<Item = CorpusEntry>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}

/// Decodes bytes as UTF-8, replacing invalid sequences.
pub fn decode_lossy(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

/// Reads one file into a [`CorpusEntry`].
///
/// Relative paths are made absolute against the current directory.
pub fn read_entry(path: &Path) -> CorpusResult<CorpusEntry> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let bytes = std::fs::read(&absolute).map_err(|e| CorpusError::read_file(&absolute, e))?;
    Ok(CorpusEntry::new(absolute, decode_lossy(bytes)))
}
