//! Query sources: the system clipboard, a file, or standard input.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use regraft_engine::{ClipboardSource, EngineError, EngineResult, StaticClipboard};

use crate::cli::QueryArgs;

/// The native system clipboard (X11/Wayland, macOS, Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl ClipboardSource for SystemClipboard {
    fn read_text(&self) -> EngineResult<String> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| EngineError::clipboard(e.to_string()))?;
        match clipboard.get_text() {
            Ok(text) => Ok(text),
            // Empty or non-text clipboard contents.
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(EngineError::clipboard(e.to_string())),
        }
    }
}

/// The source selected by the query flags.
pub fn query_source(args: &QueryArgs) -> Result<Box<dyn ClipboardSource + Send>> {
    if let Some(path) = &args.query_file {
        return Ok(Box::new(StaticClipboard::new(read_text_file(path)?)));
    }
    if args.stdin {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read query from stdin")?;
        return Ok(Box::new(StaticClipboard::new(text)));
    }
    Ok(Box::new(SystemClipboard))
}

/// Read a text file named on the command line.
pub fn read_text_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
