//! CLI argument structures and parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use regraft_engine::MAX_MARGIN;

/// Log verbosity level for CLI output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors (default)
    #[default]
    Warn,
    /// Show informational messages, warnings, and errors
    Info,
    /// Show debug messages and above
    Debug,
    /// Show all messages including trace-level details
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Regraft - find where pasted code came from and write edits back.
#[derive(Debug, Parser)]
#[command(name = "regraft", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to <config dir>/regraft/regraft.toml)
    #[arg(long, global = true, value_name = "PATH", env = "REGRAFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Set log verbosity level
    #[arg(long = "log-level", global = true, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Shorthand for --log-level debug
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective log level after applying `--verbose`.
    pub fn effective_log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Locate the query text in the project and show it in context
    Find(FindArgs),

    /// Locate the query text and replace it with the contents of a file
    Apply(ApplyArgs),

    /// Replace a named region in every file that declares it
    Region(RegionArgs),

    /// Replace the region the clipboard declares, or locate the clipboard text
    Paste(PasteArgs),

    /// Splice text into a file over an explicit byte range
    Commit(CommitArgs),
}

/// Where the text to locate comes from. The system clipboard by default.
#[derive(Debug, Clone, Default, Args)]
pub struct QueryArgs {
    /// Read the query from a file instead of the clipboard
    #[arg(long = "query-file", value_name = "FILE", conflicts_with = "stdin")]
    pub query_file: Option<PathBuf>,

    /// Read the query from standard input instead of the clipboard
    #[arg(long)]
    pub stdin: bool,
}

/// Which files are searched.
#[derive(Debug, Clone, Args)]
pub struct CorpusArgs {
    /// Project root to search
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Search only these files, falling back to the whole project when none
    /// of them can be read
    #[arg(long, value_name = "FILE", num_args = 1..)]
    pub files: Vec<PathBuf>,
}

/// Arguments for `regraft find`.
#[derive(Debug, Clone, Args)]
pub struct FindArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Characters of context around the match (0-5000)
    #[arg(long, value_name = "CHARS", value_parser = parse_margin)]
    pub margin: Option<usize>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `regraft apply`.
#[derive(Debug, Clone, Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// File holding the replacement text
    #[arg(long = "replacement-file", value_name = "FILE")]
    pub replacement_file: PathBuf,

    /// Write the change instead of only previewing it
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Arguments for `regraft region`.
#[derive(Debug, Clone, Args)]
pub struct RegionArgs {
    /// Region name as declared after `#region`
    pub name: String,

    /// File holding the new region content, delimiters included
    #[arg(long = "content-file", value_name = "FILE")]
    pub content_file: PathBuf,

    #[command(flatten)]
    pub corpus: CorpusArgs,
}

/// Arguments for `regraft paste`.
#[derive(Debug, Clone, Args)]
pub struct PasteArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Characters of context around the match (0-5000)
    #[arg(long, value_name = "CHARS", value_parser = parse_margin)]
    pub margin: Option<usize>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `regraft commit`.
#[derive(Debug, Clone, Args)]
pub struct CommitArgs {
    /// File to modify
    #[arg(long, value_name = "FILE")]
    pub file: PathBuf,

    /// Byte offset where the replaced range starts
    #[arg(long)]
    pub start: usize,

    /// Byte offset where the replaced range ends
    #[arg(long)]
    pub end: usize,

    /// File holding the text to splice in
    #[arg(long = "text-file", value_name = "FILE")]
    pub text_file: PathBuf,
}

fn parse_margin(s: &str) -> Result<usize, String> {
    let margin: usize = s.parse().map_err(|e| format!("invalid margin '{s}': {e}"))?;
    if margin > MAX_MARGIN {
        return Err(format!("margin must be at most {MAX_MARGIN}"));
    }
    Ok(margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_log_level_default() {
        assert_eq!(LogLevel::default(), LogLevel::Warn);
    }

    #[test]
    fn test_verbose_overrides_log_level() {
        let cli = Cli::try_parse_from(["regraft", "find", "-v", "--log-level", "error"])
            .expect("should parse");
        assert_eq!(cli.effective_log_level(), LogLevel::Debug);

        let cli = Cli::try_parse_from(["regraft", "find"]).expect("should parse");
        assert_eq!(cli.effective_log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_find_args() {
        let cli = Cli::try_parse_from([
            "regraft",
            "find",
            "--query-file",
            "q.txt",
            "--root",
            "proj",
            "--files",
            "a.py",
            "b.py",
            "--margin",
            "200",
            "--json",
        ])
        .expect("should parse find");

        let Commands::Find(args) = cli.command else {
            panic!("expected find");
        };
        assert_eq!(args.query.query_file, Some(PathBuf::from("q.txt")));
        assert!(!args.query.stdin);
        assert_eq!(args.corpus.root, PathBuf::from("proj"));
        assert_eq!(args.corpus.files, vec![PathBuf::from("a.py"), PathBuf::from("b.py")]);
        assert_eq!(args.margin, Some(200));
        assert!(args.json);
    }

    #[test]
    fn test_margin_range_enforced() {
        assert!(Cli::try_parse_from(["regraft", "find", "--margin", "5000"]).is_ok());
        assert!(Cli::try_parse_from(["regraft", "find", "--margin", "5001"]).is_err());
        assert!(Cli::try_parse_from(["regraft", "find", "--margin", "-1"]).is_err());
    }

    #[test]
    fn test_query_sources_conflict() {
        let result =
            Cli::try_parse_from(["regraft", "find", "--stdin", "--query-file", "q.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_region_and_commit_args() {
        let cli = Cli::try_parse_from(["regraft", "region", "header", "--content-file", "new.txt"])
            .expect("should parse region");
        let Commands::Region(args) = cli.command else {
            panic!("expected region");
        };
        assert_eq!(args.name, "header");
        assert_eq!(args.corpus.root, PathBuf::from("."));

        let cli = Cli::try_parse_from([
            "regraft", "commit", "--file", "a.py", "--start", "3", "--end", "9", "--text-file",
            "t.txt",
        ])
        .expect("should parse commit");
        let Commands::Commit(args) = cli.command else {
            panic!("expected commit");
        };
        assert_eq!((args.start, args.end), (3, 9));
    }

    #[test]
    fn test_apply_requires_replacement() {
        assert!(Cli::try_parse_from(["regraft", "apply"]).is_err());
        let cli = Cli::try_parse_from(["regraft", "apply", "--replacement-file", "r.txt", "-y"])
            .expect("should parse apply");
        let Commands::Apply(args) = cli.command else {
            panic!("expected apply");
        };
        assert!(args.yes);
    }
}
