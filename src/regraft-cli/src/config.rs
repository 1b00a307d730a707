//! Configuration file loading.
//!
//! The file is looked up in this order:
//! 1. `--config PATH` (or the `REGRAFT_CONFIG` environment variable)
//! 2. `<config dir>/regraft/regraft.toml`
//!
//! A missing file yields the defaults. Every section is optional and a
//! section only overrides the keys it names:
//!
//! ```toml
//! [engine.locate]
//! early_exit_ratio = 0.98
//!
//! [engine.context]
//! margin = 800
//!
//! [corpus]
//! exclude_dirs = ["node_modules", "dist"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use regraft_corpus::CorpusConfig;
use regraft_engine::{EngineConfig, MAX_MARGIN};
use serde::Deserialize;
use tracing::debug;

/// Configuration file name.
pub const CONFIG_FILE: &str = "regraft.toml";

/// Environment variable naming a configuration file.
pub const REGRAFT_CONFIG_ENV: &str = "REGRAFT_CONFIG";

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegraftConfig {
    /// Matching engine settings.
    pub engine: EngineConfig,
    /// Project file discovery settings. The root always comes from the
    /// command line.
    pub corpus: CorpusConfig,
}

impl RegraftConfig {
    /// Corpus settings rooted at `root`.
    pub fn corpus_for(&self, root: impl Into<PathBuf>) -> CorpusConfig {
        self.corpus.clone().with_root(root)
    }
}

/// Default configuration file location, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("regraft").join(CONFIG_FILE))
}

/// Pick the configuration file to read.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    match std::env::var_os(REGRAFT_CONFIG_ENV) {
        Some(val) if !val.is_empty() => Some(PathBuf::from(val)),
        _ => default_config_path(),
    }
}

/// Load the configuration, falling back to defaults when no file exists.
pub fn load_config(explicit: Option<&Path>) -> Result<RegraftConfig> {
    match resolve_config_path(explicit) {
        Some(path) => load_config_from_path(&path),
        None => {
            debug!("No config directory, using defaults");
            Ok(RegraftConfig::default())
        }
    }
}

/// Load configuration from a specific file.
pub fn load_config_from_path(path: &Path) -> Result<RegraftConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(RegraftConfig::default());
    }

    debug!(path = %path.display(), "Loading config file");
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse and validate configuration file contents.
pub fn parse_config(content: &str) -> Result<RegraftConfig> {
    let config: RegraftConfig = toml::from_str(content)?;
    if config.engine.context.margin > MAX_MARGIN {
        bail!(
            "engine.context.margin is {}, the maximum is {MAX_MARGIN}",
            config.engine.context.margin
        );
    }
    Ok(config)
}
