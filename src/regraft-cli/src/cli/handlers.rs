//! Command handlers for the CLI.
//!
//! Matching, context extraction and file writes are blocking work and run on
//! tokio's blocking pool.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{debug, warn};

use regraft_corpus::{CorpusProvider, FallbackCorpus, FileListCorpus, ProjectCorpus};
use regraft_engine::{
    ContextBlock, Engine, PasteOutcome, RegionReplacer, ReplacementCommitter, SearchSession,
};

use crate::cli::args::{
    ApplyArgs, Cli, Commands, CommitArgs, CorpusArgs, FindArgs, PasteArgs, RegionArgs,
};
use crate::clipboard::{query_source, read_text_file};
use crate::config::{RegraftConfig, load_config};
use crate::output::{CommitView, MatchView, RegionView};

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The command did its work.
    Done,
    /// Nothing matched; the process should exit with code 1.
    NoMatch,
}

/// Dispatch the parsed command line to its handler.
pub async fn dispatch_command(cli: Cli) -> Result<Status> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Find(args) => run_find(args, config).await,
        Commands::Apply(args) => run_apply(args, config).await,
        Commands::Region(args) => run_region(args, config).await,
        Commands::Paste(args) => run_paste(args, config).await,
        Commands::Commit(args) => run_commit(args).await,
    }
}

/// The corpus the `--root` and `--files` flags describe.
pub fn build_provider(args: &CorpusArgs, config: &RegraftConfig) -> Box<dyn CorpusProvider + Send> {
    let project = ProjectCorpus::new(config.corpus_for(&args.root));
    if args.files.is_empty() {
        Box::new(project)
    } else {
        Box::new(FallbackCorpus::new(
            FileListCorpus::new(args.files.clone()),
            project,
        ))
    }
}

/// Load the corpus, search it and cut a context block around the match.
///
/// `Ok(None)` covers both "nothing matched" and "the file changed before the
/// block could be cut".
pub fn find_match<P>(
    engine: &Engine,
    provider: &P,
    query: &str,
    margin: usize,
) -> Result<Option<(SearchSession, ContextBlock)>>
where
    P: CorpusProvider + ?Sized,
{
    if query.trim().is_empty() {
        warn!("Query is empty");
        return Ok(None);
    }

    let corpus = provider.load().context("Failed to load project files")?;
    debug!(files = corpus.len(), "Corpus loaded");

    let Some(session) = engine.search(&corpus, query) else {
        return Ok(None);
    };
    let block = session
        .context(margin)
        .with_context(|| format!("Failed to read {}", session.file_path().display()))?;
    Ok(block.map(|block| (session, block)))
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("Worker thread panicked")?
}

async fn run_find(args: FindArgs, config: RegraftConfig) -> Result<Status> {
    let margin = args.margin.unwrap_or(config.engine.context.margin);
    let engine = Engine::new(config.engine.clone());
    let provider = build_provider(&args.corpus, &config);
    let query = args.query.clone();

    let found = blocking(move || {
        let text = query_source(&query)?.read_text()?;
        find_match(&engine, &provider, &text, margin)
    })
    .await?;

    match found {
        Some((session, block)) => {
            print_view(&MatchView::new(&session, &block), args.json, MatchView::render_text)?;
            Ok(Status::Done)
        }
        None => Ok(no_match("No matching code found")),
    }
}

async fn run_apply(args: ApplyArgs, config: RegraftConfig) -> Result<Status> {
    let replacement = read_text_file(&args.replacement_file)?;
    let engine = Engine::new(config.engine.clone());
    let provider = build_provider(&args.corpus, &config);
    let query = args.query.clone();

    let found = blocking(move || {
        let text = query_source(&query)?.read_text()?;
        let Some((session, block)) = find_match(&engine, &provider, &text, 0)? else {
            return Ok(None);
        };
        let preview = ReplacementCommitter::preview(
            &block.file_path,
            block.start_offset,
            block.end_offset,
            &replacement,
        )?;
        Ok(Some((session, block, replacement, preview)))
    })
    .await?;
    let Some((session, block, replacement, preview)) = found else {
        return Ok(no_match("No matching code found"));
    };
    print!("{preview}");

    if !args.yes {
        eprintln!("Dry run, pass --yes to write the change");
        return Ok(Status::Done);
    }

    let report = blocking(move || Ok(session.commit(&block, &replacement)?)).await?;
    print!("{}", CommitView::from(&report).render_text());
    Ok(Status::Done)
}

async fn run_region(args: RegionArgs, config: RegraftConfig) -> Result<Status> {
    let content = read_text_file(&args.content_file)?;
    let provider = build_provider(&args.corpus, &config);
    let name = args.name.clone();

    let report = blocking(move || {
        let corpus = provider.load().context("Failed to load project files")?;
        Ok(RegionReplacer::replace_region(&corpus, &name, &content)?)
    })
    .await?;

    if !report.found() {
        return Ok(no_match(&format!("No file declares region '{}'", args.name)));
    }
    let view = RegionView::new(&args.name, &report);
    print!("{}", view.render_text());
    if !view.failed.is_empty() {
        bail!("{} file(s) could not be written", view.failed.len());
    }
    Ok(Status::Done)
}

async fn run_paste(args: PasteArgs, config: RegraftConfig) -> Result<Status> {
    let margin = args.margin.unwrap_or(config.engine.context.margin);
    let engine = Engine::new(config.engine.clone());
    let provider = build_provider(&args.corpus, &config);
    let query = args.query.clone();

    let (outcome, block) = blocking(move || {
        let source = query_source(&query)?;
        let outcome = engine.smart_paste(&provider, &source)?;
        let block = match &outcome {
            PasteOutcome::Located(session) => session.context(margin)?,
            _ => None,
        };
        Ok((outcome, block))
    })
    .await?;

    match (outcome, block) {
        (PasteOutcome::Empty, _) => Ok(no_match("Clipboard is empty")),
        (PasteOutcome::NoMatch, _) => Ok(no_match("No matching code found")),
        (PasteOutcome::RegionMissing(name), _) => {
            Ok(no_match(&format!("No file declares region '{name}'")))
        }
        (PasteOutcome::RegionReplaced { name, report }, _) => {
            let view = RegionView::new(&name, &report);
            print_view(&view, args.json, RegionView::render_text)?;
            if !view.failed.is_empty() {
                bail!("{} file(s) could not be written", view.failed.len());
            }
            Ok(Status::Done)
        }
        (PasteOutcome::Located(session), Some(block)) => {
            print_view(&MatchView::new(&session, &block), args.json, MatchView::render_text)?;
            Ok(Status::Done)
        }
        (PasteOutcome::Located(session), None) => Ok(no_match(&format!(
            "{} changed before the match could be shown",
            session.file_path().display()
        ))),
    }
}

async fn run_commit(args: CommitArgs) -> Result<Status> {
    let text = read_text_file(&args.text_file)?;
    let report = blocking(move || {
        ReplacementCommitter::commit(&args.file, args.start, args.end, &text)
            .with_context(|| format!("Failed to commit to {}", args.file.display()))
    })
    .await?;
    print!("{}", CommitView::from(&report).render_text());
    Ok(Status::Done)
}

fn print_view<V: Serialize>(view: &V, json: bool, render: fn(&V) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        print!("{}", render(view));
    }
    Ok(())
}

fn no_match(message: &str) -> Status {
    eprintln!("{message}");
    Status::NoMatch
}
