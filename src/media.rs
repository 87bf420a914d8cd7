//! Media manifest types and planning of work items.
//!
//! A manifest is a JSON document listing posts and the media attached to
//! them. Planning turns the posts into a flat list of [`MediaItem`]s, each
//! carrying the directory it should be saved to.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::dispatch::{NO_MIME_TYPE, WorkItem};
use crate::download::sanitize_path_segment;

/// Errors raised while loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest {path}: {source}")]
    Read {
        /// Path of the manifest.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid JSON or does not match the expected shape.
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Error for unknown grouping strategy names.
#[derive(Debug, Error)]
#[error("unknown grouping strategy '{0}' (expected none, all or dynamic)")]
pub struct UnknownGroupingStrategy(String);

/// One downloadable media file attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Media {
    /// Unique media id; also the file stem on disk.
    pub id: String,
    /// Source URL of the original file.
    pub url: String,
    /// MIME type, e.g. `image/png`. Empty when the source omitted it.
    #[serde(default, alias = "mimetype")]
    pub mime_type: String,
}

/// A post and its media.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub media: Vec<Media>,
    /// Whether the current user may view the post (blurred otherwise).
    #[serde(default = "default_true")]
    pub current_user_can_view: bool,
}

fn default_true() -> bool {
    true
}

/// A list of posts to download.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    /// Optional creator handle, used as a subdirectory of the download dir.
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl Manifest {
    /// Parses a manifest from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Read`] if the file cannot be read and
    /// [`ManifestError::Parse`] on malformed JSON.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let json = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// How media of a post are grouped into directories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingStrategy {
    /// Everything goes straight into the download directory.
    None,
    /// Every post gets its own directory named after its title.
    All,
    /// Only posts with more than one media get their own directory.
    #[default]
    Dynamic,
}

impl GroupingStrategy {
    /// Directory for the media of `post` under `base`.
    #[must_use]
    pub fn directory_for(self, base: &Path, post: &Post) -> PathBuf {
        let own_dir = match self {
            Self::None => false,
            Self::All => true,
            Self::Dynamic => post.media.len() > 1,
        };
        if own_dir {
            base.join(sanitize_path_segment(&post.title))
        } else {
            base.to_path_buf()
        }
    }
}

impl FromStr for GroupingStrategy {
    type Err = UnknownGroupingStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "all" => Ok(Self::All),
            "dynamic" => Ok(Self::Dynamic),
            _ => Err(UnknownGroupingStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for GroupingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::All => "all",
            Self::Dynamic => "dynamic",
        })
    }
}

/// A media file scheduled for download into a specific directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub id: String,
    pub url: String,
    pub mime_type: String,
    /// Directory the file is saved into.
    pub directory: PathBuf,
}

impl MediaItem {
    /// Eligibility predicate for the dispatcher: media without a MIME type
    /// are skipped with [`NO_MIME_TYPE`].
    #[must_use]
    pub fn eligibility(item: &Self) -> Option<String> {
        item.mime_type
            .trim()
            .is_empty()
            .then(|| NO_MIME_TYPE.to_string())
    }
}

impl WorkItem for MediaItem {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Flattens posts into work items according to `config`.
///
/// Posts the user cannot view are dropped unless inaccessible downloads
/// are enabled, and at most `max_posts` posts are considered (0 = all).
#[must_use]
pub fn plan_media_items(manifest: &Manifest, config: &RunConfig) -> Vec<MediaItem> {
    let base = match manifest.creator.as_deref() {
        Some(creator) if !creator.trim().is_empty() => {
            config.download_dir.join(sanitize_path_segment(creator))
        }
        _ => config.download_dir.clone(),
    };

    let limit = if config.max_posts == 0 {
        usize::MAX
    } else {
        config.max_posts
    };

    let mut items = Vec::new();
    let mut posts_used = 0usize;
    for post in manifest.posts.iter().take(limit) {
        if !post.current_user_can_view && !config.download_inaccessible {
            debug!(post_id = %post.id, "skipping post that is not viewable");
            continue;
        }
        posts_used += 1;
        let directory = config.grouping.directory_for(&base, post);
        items.extend(post.media.iter().map(|media| MediaItem {
            id: media.id.clone(),
            url: media.url.clone(),
            mime_type: media.mime_type.clone(),
            directory: directory.clone(),
        }));
    }

    info!(items = items.len(), posts = posts_used, "planned downloads");
    items
}
