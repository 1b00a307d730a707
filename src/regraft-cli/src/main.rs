//! Regraft CLI - Main entry point.
//!
//! - `cli/` - Command-line argument parsing and dispatch
//! - `config` - `regraft.toml` loading
//! - `clipboard` - Where the query text comes from
//! - `output` - Terminal and JSON rendering

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use regraft_cli::cli::{Cli, Status, dispatch_command};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // RUST_LOG wins over --log-level; logs go to stderr so stdout carries results.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.effective_log_level().as_filter_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match dispatch_command(cli).await? {
        Status::Done => Ok(ExitCode::SUCCESS),
        Status::NoMatch => Ok(ExitCode::from(1)),
    }
}
