//! CLI argument parsing and command dispatch.
//!
//! - `args` - Command-line argument structures
//! - `handlers` - Command execution handlers

pub mod args;
pub mod handlers;

// Re-export main types
pub use args::{
    ApplyArgs, Cli, Commands, CommitArgs, CorpusArgs, FindArgs, LogLevel, PasteArgs, QueryArgs,
    RegionArgs,
};
pub use handlers::{Status, dispatch_command};
