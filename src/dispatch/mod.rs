//! Bounded concurrent dispatch of work items.
//!
//! The [`Dispatcher`] runs at most N transfers at once and hands their
//! [`Outcome`]s to the caller through an [`OutcomeStream`] as they complete.
//! Completion order is unspecified.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mediadl_core::dispatch::Dispatcher;
//! use mediadl_core::download::{HttpFetcher, MediaTransfer};
//! use mediadl_core::media::MediaItem;
//!
//! # async fn example(items: Vec<MediaItem>) {
//! let transfer = MediaTransfer::new(Arc::new(HttpFetcher::new()));
//! let dispatcher = Dispatcher::new(Arc::new(transfer))
//!     .with_eligibility(MediaItem::eligibility);
//! let mut outcomes = dispatcher.dispatch(items, 8);
//! while let Some(outcome) = outcomes.recv().await {
//!     if outcome.is_failed() {
//!         // Stop admitting new work and wait for running transfers.
//!         outcomes.close().await;
//!         break;
//!     }
//! }
//! # }
//! ```

mod dispatcher;
mod outcome;
mod stream;

pub use dispatcher::{DEFAULT_CONCURRENCY, Dispatcher, Transfer, effective_concurrency};
pub use outcome::{ALREADY_DOWNLOADED, NO_MIME_TYPE, Outcome, OutcomeTally, WorkItem};
pub use stream::OutcomeStream;
