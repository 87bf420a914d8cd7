//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use mediadl_core::GroupingStrategy;
use mediadl_core::config::DEFAULT_DOWNLOAD_DIR;

/// Download the media listed in a manifest, a bounded number at a time.
///
/// Already downloaded files are skipped, so an interrupted run can simply be
/// started again.
#[derive(Parser, Debug)]
#[command(name = "mediadl")]
#[command(author, version, about)]
pub struct Args {
    /// JSON manifest listing posts and their media
    pub manifest: PathBuf,

    /// Base directory to download into
    #[arg(short = 'd', long, default_value = DEFAULT_DOWNLOAD_DIR)]
    pub download_dir: PathBuf,

    /// Maximum concurrent downloads [default: $MEDIADL_MEDIA_CONCURRENCY or 8]
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: Option<u16>,

    /// How posts are grouped into directories (none, all, dynamic)
    #[arg(short = 'g', long, default_value_t = GroupingStrategy::Dynamic)]
    pub grouping: GroupingStrategy,

    /// Also download posts the current user cannot view
    #[arg(long)]
    pub download_inaccessible: bool,

    /// Limit the number of posts considered (0 for no limit)
    #[arg(long, default_value_t = 0)]
    pub max_posts: usize,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}
