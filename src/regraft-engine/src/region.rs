//! Named region replacement.
//!
//! A region is a block delimited by a `#region NAME` / `#endregion` tag pair
//! written in any of the supported comment styles:
//!
//! ```text
//! // #region "name"      # #region name      -- #region 'name'
//! ...                    ...                 ...
//! // #endregion          # #endregion        -- #endregion
//!
//! /* #region name */     <!-- #region name -->
//! ...                    ...
//! /* #endregion */       <!-- #endregion -->
//! ```
//!
//! The leading `#` before `region`/`endregion` is optional.

use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use regraft_corpus::Corpus;
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};

/// Region declarations recognised at the start of pasted text, tried in order.
static DECLARATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?://|#|--)[ \t]*#?region[ \t]+["']?([^"'\n\r]+?)["']?[ \t]*(?:\r?\n|\z)"#,
        r#"/\*[ \t]*#?region[ \t]+["']?([^"'\n\r]+?)["']?[ \t]*\*/"#,
        r#"<!--[ \t]*#?region[ \t]+["']?([^"'\n\r]+?)["']?[ \t]*-->"#,
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Build the pattern matching a whole region named `name`, delimiters
/// included, in any comment style.
///
/// Matching is case-insensitive and `.` spans newlines. Any text may follow
/// the name on the tag line, but the name must end there: `Foo` does not
/// match a region called `FooBar`.
pub fn region_pattern(name: &str) -> EngineResult<Regex> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::EmptyRegionName);
    }
    let name = regex::escape(name);
    let tag = format!(r#"#?region\s+["']?{name}(?:["']|[^\w]|\z).*?"#);

    let line = format!(r"(?://|#|--)\s*{tag}(?://|#|--)\s*#?endregion");
    let block = format!(r"/\*\s*{tag}#?endregion\s*\*/");
    let html = format!(r"<!--\s*{tag}#?endregion\s*-->");

    Ok(Regex::new(&format!("(?is){line}|{block}|{html}"))?)
}

/// Name of the region declared by `text`, if any.
///
/// The earliest declaration wins, so `/* #region x */` is read as a block
/// comment rather than a `#` line comment starting inside it.
pub fn detect_region_name(text: &str) -> Option<String> {
    DECLARATION_PATTERNS
        .iter()
        .filter_map(|pattern| pattern.captures(text))
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str().trim();
            (!name.is_empty()).then(|| (whole.start(), name.to_string()))
        })
        .min_by_key(|(start, _)| *start)
        .map(|(_, name)| name)
}

/// Files touched by a region replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionReport {
    /// Files where the region was found and rewritten.
    pub updated: Vec<PathBuf>,
    /// Files where the region was found but the write failed.
    pub failed: Vec<(PathBuf, String)>,
}

impl RegionReport {
    /// Whether any file contained the region.
    pub fn found(&self) -> bool {
        !self.updated.is_empty() || !self.failed.is_empty()
    }
}

/// Replaces named regions across a corpus.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionReplacer;

impl RegionReplacer {
    /// Replace the first region called `name` in every corpus file with
    /// `new_content`, verbatim.
    ///
    /// Every file containing the region is rewritten. A failed write is
    /// recorded in the report and does not stop the remaining files.
    pub fn replace_region(
        corpus: &Corpus,
        name: &str,
        new_content: &str,
    ) -> EngineResult<RegionReport> {
        let pattern = region_pattern(name)?;
        let mut report = RegionReport::default();

        for entry in corpus {
            if !pattern.is_match(&entry.text) {
                continue;
            }
            let updated = pattern.replacen(&entry.text, 1, NoExpand(new_content));
            debug!(path = %entry.absolute_path.display(), "Region found");

            match fs::write(&entry.absolute_path, updated.as_bytes()) {
                Ok(()) => {
                    info!(path = %entry.absolute_path.display(), region = name, "Region replaced");
                    report.updated.push(entry.absolute_path.clone());
                }
                Err(e) => {
                    warn!(
                        path = %entry.absolute_path.display(),
                        error = %e,
                        "Failed to write region replacement"
                    );
                    report
                        .failed
                        .push((entry.absolute_path.clone(), e.to_string()));
                }
            }
        }

        if !report.found() {
            debug!(region = name, "Region not found in corpus");
        }
        Ok(report)
    }
}
