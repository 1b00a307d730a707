//! Configuration types for corpus discovery.

use std::path::PathBuf;

use serde::Deserialize;

/// Extensions treated as source code when no include list is configured.
pub const DEFAULT_CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "html", "css", "java", "cpp", "c", "h", "cs", "go", "rs",
    "php", "rb", "swift", "kt", "sql", "json", "xml", "yml", "yaml",
];

/// Directory names that are never descended into.
///
/// Directories starting with `.` are skipped separately, see
/// [`CorpusConfig::should_exclude_dir`].
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &["__pycache__", "node_modules", "venv", "env", "target"];

/// Configuration for project corpus discovery.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Root directory to walk. Set by the caller, never read from a file.
    #[serde(skip)]
    pub root: PathBuf,

    /// Maximum depth to traverse into subdirectories.
    /// `None` means unlimited depth.
    pub max_depth: Option<usize>,

    /// Whether to follow symbolic links.
    pub follow_symlinks: bool,

    /// Whether to respect .gitignore files.
    pub respect_gitignore: bool,

    /// Whether to include hidden files and directories (starting with .).
    pub include_hidden: bool,

    /// File extensions to include, compared case-insensitively.
    pub include_extensions: Vec<String>,

    /// Directories to exclude by name.
    pub exclude_dirs: Vec<String>,

    /// Files larger than this (in bytes) are not read.
    pub max_file_size: u64,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            max_depth: None,
            follow_symlinks: false,
            respect_gitignore: true,
            include_hidden: false,
            include_extensions: DEFAULT_CODE_EXTENSIONS
                .iter()
                .map(|e| (*e).to_string())
                .collect(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS
                .iter()
                .map(|d| (*d).to_string())
                .collect(),
            max_file_size: 10 * 1024 * 1024, // 10 MB
        }
    }
}

impl CorpusConfig {
    /// Creates a new configuration with the specified root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Creates a builder for constructing a configuration.
    pub fn builder(root: impl Into<PathBuf>) -> CorpusConfigBuilder {
        CorpusConfigBuilder::new(root)
    }

    /// Returns a copy of this configuration rooted at `root`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Checks if a file extension should be included.
    ///
    /// An empty include list accepts every extension.
    pub fn should_include_extension(&self, ext: &str) -> bool {
        self.include_extensions.is_empty()
            || self
                .include_extensions
                .iter()
                .any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Checks if a directory should be excluded.
    pub fn should_exclude_dir(&self, name: &str) -> bool {
        if !self.include_hidden && name.starts_with('.') && name != "." && name != ".." {
            return true;
        }
        self.exclude_dirs.iter().any(|d| d == name)
    }
}

/// Builder for creating `CorpusConfig` instances.
#[derive(Debug)]
pub struct CorpusConfigBuilder {
    config: CorpusConfig,
}

impl CorpusConfigBuilder {
    /// Creates a new builder with the specified root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            config: CorpusConfig::new(root),
        }
    }

    /// Sets the maximum traversal depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = Some(depth);
        self
    }

    /// Sets whether to follow symbolic links.
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.config.follow_symlinks = follow;
        self
    }

    /// Sets whether to respect .gitignore files.
    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.config.respect_gitignore = respect;
        self
    }

    /// Sets whether to include hidden files.
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.include_hidden = include;
        self
    }

    /// Sets file extensions to include.
    pub fn include_extensions(
        mut self,
        extensions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.config.include_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Sets directories to exclude.
    pub fn exclude_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config.exclude_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the maximum file size to read.
    pub fn max_file_size(mut self, size: u64) -> Self {
        self.config.max_file_size = size;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> CorpusConfig {
        self.config
    }
}
