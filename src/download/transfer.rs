//! Transfer executor for a single media item.
//!
//! A transfer resolves the destination, skips items that are already on
//! disk, and otherwise fetches into a sibling `.tmp` file that is renamed
//! into place only after the whole body was written. A failed transfer
//! never leaves a file at the destination path.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::client::Fetcher;
use super::destination::{destination_for, temp_path_for};
use super::error::DownloadError;
use crate::dispatch::{ALREADY_DOWNLOADED, Outcome, Transfer};
use crate::media::MediaItem;

/// Downloads media items to their resolved destination.
///
/// Holds no mutable state, so one instance serves all concurrent
/// transfers.
#[derive(Clone)]
pub struct MediaTransfer {
    fetcher: Arc<dyn Fetcher>,
}

impl std::fmt::Debug for MediaTransfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaTransfer").finish_non_exhaustive()
    }
}

impl MediaTransfer {
    /// Creates an executor that fetches through `fetcher`.
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    async fn fetch_into_place(
        &self,
        item: &MediaItem,
        destination: &Path,
    ) -> Result<u64, DownloadError> {
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::io(parent, e))?;
        }

        let temp_path = temp_path_for(destination);
        let result = self.fetch_and_rename(&item.url, &temp_path, destination).await;

        if result.is_err() {
            debug!(path = %temp_path.display(), "cleaning up temp file after error");
            let _ = tokio::fs::remove_file(&temp_path).await;
        }

        result
    }

    async fn fetch_and_rename(
        &self,
        url: &str,
        temp_path: &Path,
        destination: &Path,
    ) -> Result<u64, DownloadError> {
        let bytes = self.fetcher.fetch_to(url, temp_path).await?;
        tokio::fs::rename(temp_path, destination)
            .await
            .map_err(|e| DownloadError::io(destination, e))?;
        Ok(bytes)
    }
}

#[async_trait]
impl Transfer<MediaItem> for MediaTransfer {
    #[instrument(skip(self, item), fields(item_id = %item.id, url = %item.url))]
    async fn transfer(&self, item: &MediaItem) -> Outcome<MediaItem> {
        let destination = match destination_for(item) {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "cannot resolve destination");
                return Outcome::failed(item.clone(), e);
            }
        };

        match tokio::fs::try_exists(&destination).await {
            Ok(true) => {
                debug!(path = %destination.display(), "already downloaded");
                return Outcome::skipped(item.clone(), ALREADY_DOWNLOADED);
            }
            Ok(false) => {}
            Err(e) => {
                let e = DownloadError::io(&destination, e);
                warn!(error = %e, "cannot check destination");
                return Outcome::failed(item.clone(), e);
            }
        }

        match self.fetch_into_place(item, &destination).await {
            Ok(bytes) => {
                info!(path = %destination.display(), bytes, "download complete");
                Outcome::success(item.clone())
            }
            Err(e) => {
                warn!(error = %e, "download failed");
                Outcome::failed(item.clone(), e)
            }
        }
    }
}
