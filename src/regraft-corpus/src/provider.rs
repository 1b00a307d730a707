//! Corpus providers: where candidate files come from.

use std::path::PathBuf;
use std::sync::Arc;

use ignore::WalkBuilder;

use crate::config::CorpusConfig;
use crate::corpus::{Corpus, read_entry};
use crate::error::{CorpusError, CorpusResult};

/// Supplies a fresh corpus snapshot for each search.
pub trait CorpusProvider {
    /// Loads the corpus. Unreadable files are skipped, not reported.
    fn load(&self) -> CorpusResult<Corpus>;
}

impl<P: CorpusProvider + ?Sized> CorpusProvider for &P {
    fn load(&self) -> CorpusResult<Corpus> {
        (**self).load()
    }
}

impl<P: CorpusProvider + ?Sized> CorpusProvider for Box<P> {
    fn load(&self) -> CorpusResult<Corpus> {
        (**self).load()
    }
}

/// Walks a project directory and reads every matching source file.
///
/// # Example
///
/// ```no_run
/// use regraft_corpus::{CorpusConfig, CorpusProvider, ProjectCorpus};
///
/// let config = CorpusConfig::builder("/path/to/project")
///     .include_extensions(["rs", "toml"])
///     .build();
/// let corpus = ProjectCorpus::new(config).load()?;
/// # Ok::<(), regraft_corpus::CorpusError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ProjectCorpus {
    config: CorpusConfig,
}

impl ProjectCorpus {
    /// Creates a provider for the configured root.
    pub fn new(config: CorpusConfig) -> Self {
        Self { config }
    }

    /// Lists the files that would be read, in walk order.
    pub fn discover(&self) -> CorpusResult<Vec<PathBuf>> {
        let root = &self.config.root;
        if !root.exists() {
            return Err(CorpusError::root_not_found(root));
        }
        if !root.is_dir() {
            return Err(CorpusError::not_a_directory(root));
        }
        let root = if root.is_absolute() {
            root.clone()
        } else {
            std::env::current_dir()?.join(root)
        };

        let mut builder = WalkBuilder::new(&root);
        builder
            .hidden(!self.config.include_hidden)
            .follow_links(self.config.follow_symlinks)
            .git_ignore(self.config.respect_gitignore)
            .git_global(self.config.respect_gitignore)
            .git_exclude(self.config.respect_gitignore)
            .sort_by_file_name(|a, b| a.cmp(b));

        if let Some(depth) = self.config.max_depth {
            builder.max_depth(Some(depth));
        }

        let filter_config = Arc::new(self.config.clone());
        let walk_root = root.clone();
        builder.filter_entry(move |entry| {
            if entry.path() == walk_root {
                return true;
            }
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            match entry.file_name().to_str() {
                Some(name) if is_dir => !filter_config.should_exclude_dir(name),
                _ => true,
            }
        });

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!("Error walking directory: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let included = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| self.config.should_include_extension(ext))
                || (self.config.include_extensions.is_empty() && path.extension().is_none());
            if !included {
                continue;
            }

            match path.metadata() {
                Ok(meta) if meta.len() > self.config.max_file_size => {
                    tracing::debug!(
                        path = %path.display(),
                        size = meta.len(),
                        "Skipping file larger than max_file_size"
                    );
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(path = %path.display(), "Skipping unreadable file: {}", e);
                    continue;
                }
            }

            files.push(path.to_path_buf());
        }

        Ok(files)
    }
}

impl CorpusProvider for ProjectCorpus {
    fn load(&self) -> CorpusResult<Corpus> {
        let paths = self.discover()?;
        let corpus = FileListCorpus::new(paths).load()?;
        tracing::debug!(
            root = %self.config.root.display(),
            files = corpus.len(),
            "Loaded project corpus"
        );
        Ok(corpus)
    }
}

/// Reads an explicit list of files, such as the ones a user has listed in a
/// project view. Missing and unreadable paths are silently skipped.
#[derive(Debug, Clone, Default)]
pub struct FileListCorpus {
    paths: Vec<PathBuf>,
}

impl FileListCorpus {
    /// Creates a provider for the given paths.
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl CorpusProvider for FileListCorpus {
    fn load(&self) -> CorpusResult<Corpus> {
        let mut corpus = Corpus::new();
        for path in &self.paths {
            if !path.is_file() {
                tracing::debug!(path = %path.display(), "Skipping nonexistent file");
                continue;
            }
            match read_entry(path) {
                Ok(entry) => corpus.push(entry),
                Err(e) => tracing::debug!("{}", e),
            }
        }
        Ok(corpus)
    }
}

/// Uses `primary` unless it yields no files, then `fallback`.
#[derive(Debug, Clone)]
pub struct FallbackCorpus<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackCorpus<P, F> {
    /// Creates a provider that falls back when the primary corpus is empty.
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: CorpusProvider, F: CorpusProvider> CorpusProvider for FallbackCorpus<P, F> {
    fn load(&self) -> CorpusResult<Corpus> {
        let corpus = self.primary.load()?;
        if !corpus.is_empty() {
            return Ok(corpus);
        }
        tracing::info!("Primary corpus is empty, using fallback provider");
        self.fallback.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_project() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir_all(root.join("__pycache__")).unwrap();
        fs::create_dir_all(root.join(".hidden")).unwrap();

        fs::write(root.join("src/main.py"), "print('main')\n").unwrap();
        fs::write(root.join("src/util.rs"), "fn util() {}\n").unwrap();
        fs::write(root.join("notes.bin"), [0u8, 1, 2]).unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "module.exports = 1;\n").unwrap();
        fs::write(root.join("__pycache__/main.py"), "cached\n").unwrap();
        fs::write(root.join(".hidden/secret.py"), "hidden\n").unwrap();

        temp
    }

    #[test]
    fn test_project_corpus_filters() {
        let temp = setup_project();
        let corpus = ProjectCorpus::new(CorpusConfig::new(temp.path()))
            .load()
            .unwrap();

        let names: Vec<String> = corpus
            .iter()
            .map(|e| e.file_name().into_owned())
            .collect();
        assert_eq!(names, vec!["main.py".to_string(), "util.rs".to_string()]);
        assert!(corpus.iter().all(|e| e.absolute_path.is_absolute()));
    }

    #[test]
    fn test_project_corpus_max_file_size() {
        let temp = setup_project();
        fs::write(temp.path().join("src/big.py"), "x".repeat(4096)).unwrap();

        let config = CorpusConfig::builder(temp.path()).max_file_size(1024).build();
        let corpus = ProjectCorpus::new(config).load().unwrap();
        assert!(corpus.iter().all(|e| e.file_name() != "big.py"));
    }

    #[test]
    fn test_project_corpus_missing_root() {
        let temp = TempDir::new().unwrap();
        let err = ProjectCorpus::new(CorpusConfig::new(temp.path().join("nope")))
            .load()
            .unwrap_err();
        assert!(matches!(err, CorpusError::RootNotFound(_)));
    }

    #[test]
    fn test_project_corpus_root_is_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.py");
        fs::write(&file, "x").unwrap();

        let err = ProjectCorpus::new(CorpusConfig::new(&file))
            .load()
            .unwrap_err();
        assert!(matches!(err, CorpusError::NotADirectory(_)));
    }

    #[test]
    fn test_file_list_skips_missing() {
        let temp = setup_project();
        let provider = FileListCorpus::new([
            temp.path().join("src/main.py"),
            temp.path().join("src/missing.py"),
        ]);
        let corpus = provider.load().unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.iter().next().unwrap().text, "print('main')\n");
    }

    #[test]
    fn test_fallback_used_when_primary_empty() {
        let temp = setup_project();
        let primary = FileListCorpus::new(Vec::<PathBuf>::new());
        let fallback = ProjectCorpus::new(CorpusConfig::new(temp.path()));

        let corpus = FallbackCorpus::new(primary, fallback).load().unwrap();
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn test_fallback_not_used_when_primary_has_files() {
        let temp = setup_project();
        let primary = FileListCorpus::new([temp.path().join("src/util.rs")]);
        let fallback = ProjectCorpus::new(CorpusConfig::new(temp.path()));

        let corpus = FallbackCorpus::new(primary, fallback).load().unwrap();
        assert_eq!(corpus.len(), 1);
    }
}
