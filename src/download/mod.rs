//! Transfer executor: downloads one media item to disk.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Destination derived from the item id and MIME subtype
//! - Skip when the destination already exists (re-runs only do the rest)
//! - Temp file + rename, so a failed transfer never leaves a file at the
//!   final path
//! - Configurable timeouts (30s connect, 5min read by default)
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use mediadl_core::dispatch::Transfer;
//! use mediadl_core::download::{HttpFetcher, MediaTransfer};
//! use mediadl_core::media::MediaItem;
//!
//! # async fn example() {
//! let transfer = MediaTransfer::new(Arc::new(HttpFetcher::new()));
//! let item = MediaItem {
//!     id: "1234".to_string(),
//!     url: "https://example.com/1234.png".to_string(),
//!     mime_type: "image/png".to_string(),
//!     directory: PathBuf::from("./downloads"),
//! };
//! let outcome = transfer.transfer(&item).await;
//! println!("{outcome:?}");
//! # }
//! ```

mod client;
pub mod constants;
mod destination;
mod error;
mod transfer;

pub use client::{Fetcher, HttpFetcher};
pub use destination::{destination_for, file_extension, sanitize_path_segment, temp_path_for};
pub use error::DownloadError;
pub use transfer::MediaTransfer;
