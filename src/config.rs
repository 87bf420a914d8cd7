//! Run configuration and concurrency resolution.
//!
//! Concurrency precedence: CLI flag, then the
//! `MEDIADL_MEDIA_CONCURRENCY` environment variable, then
//! [`DEFAULT_CONCURRENCY`]. The dispatcher itself only ever sees the
//! resolved number.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::dispatch::DEFAULT_CONCURRENCY;
use crate::media::GroupingStrategy;

/// Environment variable overriding the default concurrency.
pub const CONCURRENCY_ENV_VAR: &str = "MEDIADL_MEDIA_CONCURRENCY";

/// Default download directory.
pub const DEFAULT_DOWNLOAD_DIR: &str = "./downloads";

/// Errors raised while preparing a run.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The download directory path exists but is not a directory.
    #[error("download path {path} exists and is not a directory")]
    NotADirectory {
        /// Offending path.
        path: PathBuf,
    },

    /// The download directory could not be created.
    #[error("failed to create download directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Everything a download run needs besides the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Base directory for downloads.
    pub download_dir: PathBuf,
    /// How posts map to directories.
    pub grouping: GroupingStrategy,
    /// Also download posts the user cannot view.
    pub download_inaccessible: bool,
    /// Maximum number of posts to consider (0 = all).
    pub max_posts: usize,
    /// Concurrency ceiling handed to the dispatcher.
    pub concurrency: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            grouping: GroupingStrategy::default(),
            download_inaccessible: false,
            max_posts: 0,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Resolves the concurrency ceiling from a CLI value and an env value.
///
/// Values that are not positive integers are ignored.
#[must_use]
pub fn resolve_concurrency(cli: Option<usize>, env: Option<&str>) -> usize {
    if let Some(value) = cli.filter(|&n| n > 0) {
        debug!(concurrency = value, "concurrency from command line");
        return value;
    }

    if let Some(raw) = env {
        match raw.trim().parse::<usize>() {
            Ok(value) if value > 0 => {
                debug!(concurrency = value, "concurrency from environment");
                return value;
            }
            _ => warn!(
                variable = CONCURRENCY_ENV_VAR,
                value = %raw,
                "ignoring invalid concurrency override"
            ),
        }
    }

    DEFAULT_CONCURRENCY
}

/// Like [`resolve_concurrency`], reading the env value from the process.
#[must_use]
pub fn resolve_concurrency_from_env(cli: Option<usize>) -> usize {
    let env = std::env::var(CONCURRENCY_ENV_VAR).ok();
    resolve_concurrency(cli, env.as_deref())
}

/// Creates the download directory if it does not exist.
///
/// # Errors
///
/// Fails if the path is an existing file or cannot be created.
pub fn prepare_download_dir(path: &Path) -> Result<(), ConfigError> {
    if path.exists() && !path.is_dir() {
        return Err(ConfigError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    std::fs::create_dir_all(path).map_err(|source| ConfigError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
