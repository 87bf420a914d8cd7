//! mediadl core library
//!
//! Downloads media listed in a manifest to local disk, running a bounded
//! number of transfers at once and reporting a per-item outcome as soon as
//! each transfer finishes.
//!
//! # Architecture
//!
//! - [`dispatch`] - Bounded concurrent dispatcher and its outcome stream
//! - [`download`] - Transfer executor (destination, skip-if-present, fetch, rename)
//! - [`media`] - Manifest types and planning of work items
//! - [`config`] - Run configuration and concurrency resolution

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dispatch;
pub mod download;
pub mod media;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use config::{
    CONCURRENCY_ENV_VAR, ConfigError, RunConfig, prepare_download_dir, resolve_concurrency,
    resolve_concurrency_from_env,
};
pub use dispatch::{
    ALREADY_DOWNLOADED, DEFAULT_CONCURRENCY, Dispatcher, NO_MIME_TYPE, Outcome, OutcomeStream,
    OutcomeTally, Transfer, WorkItem, effective_concurrency,
};
pub use download::{DownloadError, Fetcher, HttpFetcher, MediaTransfer};
pub use media::{GroupingStrategy, Manifest, ManifestError, Media, MediaItem, Post, plan_media_items};
