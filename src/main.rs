//! CLI entry point for mediadl.

use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mediadl_core::{
    Dispatcher, HttpFetcher, Manifest, MediaItem, MediaTransfer, Outcome, OutcomeTally,
    RunConfig, plan_media_items, prepare_download_dir, resolve_concurrency_from_env,
};
use tracing::{debug, info, warn};

mod cli;
mod progress;

use cli::Args;
use progress::ProgressReporter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let manifest = Manifest::from_path(&args.manifest)
        .with_context(|| format!("cannot load manifest {}", args.manifest.display()))?;

    let config = RunConfig {
        download_dir: args.download_dir.clone(),
        grouping: args.grouping,
        download_inaccessible: args.download_inaccessible,
        max_posts: args.max_posts,
        concurrency: resolve_concurrency_from_env(args.concurrency.map(usize::from)),
    };
    prepare_download_dir(&config.download_dir)?;

    let items = plan_media_items(&manifest, &config);
    if items.is_empty() {
        info!("Nothing to download");
        return Ok(ExitCode::SUCCESS);
    }

    let transfer = MediaTransfer::new(Arc::new(HttpFetcher::new()));
    let dispatcher =
        Dispatcher::new(Arc::new(transfer)).with_eligibility(MediaItem::eligibility);

    let show_progress = !args.no_progress && !args.quiet && std::io::stderr().is_terminal();
    let progress = ProgressReporter::new(show_progress, items.len());

    let concurrency = i64::try_from(config.concurrency).unwrap_or(i64::MAX);
    let mut outcomes = dispatcher.dispatch(items, concurrency);
    let mut tally = OutcomeTally::default();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            outcome = outcomes.recv() => {
                let Some(outcome) = outcome else { break };
                log_outcome(&outcome);
                progress.record(&outcome);
                tally.record(&outcome);
            }
            _ = &mut ctrl_c => {
                warn!("Interrupted, waiting for running downloads to finish");
                outcomes.close().await;
                progress.finish();
                info!(
                    downloaded = tally.succeeded,
                    skipped = tally.skipped,
                    failed = tally.failed,
                    "Download interrupted"
                );
                return Ok(ExitCode::from(130));
            }
        }
    }
    progress.finish();

    info!(
        downloaded = tally.succeeded,
        skipped = tally.skipped,
        failed = tally.failed,
        total = tally.total(),
        "Download complete"
    );

    Ok(if tally.failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn log_outcome(outcome: &Outcome<MediaItem>) {
    match outcome {
        Outcome::Success { item } => info!(item_id = %item.id, "Downloaded"),
        Outcome::Skipped { item, reason } => info!(item_id = %item.id, %reason, "Skipped"),
        Outcome::Failed { item, error } => {
            warn!(item_id = %item.id, url = %item.url, %error, "Failed");
        }
    }
}
