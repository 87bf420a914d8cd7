//! Dispatcher for concurrent transfers with a fixed concurrency ceiling.
//!
//! Admission happens on a single background task that walks the items in
//! their original order. Ineligible items are reported straight away;
//! eligible items wait for a semaphore permit and then run on their own
//! task. The admission task joins every transfer task before it drops its
//! channel sender, so the outcome channel closes exactly once, after the
//! last producer has finished.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::outcome::{Outcome, WorkItem};
use super::stream::OutcomeStream;

/// Minimum effective concurrency.
const MIN_CONCURRENCY: usize = 1;

/// Default concurrency if no override is configured.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Performs the transfer of a single work item.
///
/// Implementations must classify every result into an [`Outcome`] rather
/// than returning errors, and must be safe to call concurrently for
/// different items.
#[async_trait]
pub trait Transfer<T: WorkItem>: Send + Sync {
    /// Runs one transfer attempt for `item`.
    async fn transfer(&self, item: &T) -> Outcome<T>;
}

type Eligibility<T> = Arc<dyn Fn(&T) -> Option<String> + Send + Sync>;

/// Clamps a requested concurrency to `1..=item_count`.
///
/// Zero and negative requests are corrected to 1 rather than rejected.
#[must_use]
pub fn effective_concurrency(requested: i64, item_count: usize) -> usize {
    usize::try_from(requested)
        .unwrap_or(0)
        .min(item_count)
        .max(MIN_CONCURRENCY)
}

/// Bounded concurrent dispatcher.
///
/// Each call to [`dispatch`](Self::dispatch) creates an independent
/// session; the dispatcher itself holds no per-call state and can be
/// cloned cheaply.
pub struct Dispatcher<T: WorkItem> {
    transfer: Arc<dyn Transfer<T>>,
    eligibility: Eligibility<T>,
}

impl<T: WorkItem> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            transfer: Arc::clone(&self.transfer),
            eligibility: Arc::clone(&self.eligibility),
        }
    }
}

impl<T: WorkItem> fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl<T: WorkItem> Dispatcher<T> {
    /// Creates a dispatcher that treats every item as eligible.
    #[must_use]
    pub fn new(transfer: Arc<dyn Transfer<T>>) -> Self {
        Self {
            transfer,
            eligibility: Arc::new(|_: &T| None),
        }
    }

    /// Sets the eligibility predicate.
    ///
    /// Returning `Some(reason)` reports the item as skipped with that reason
    /// without consuming a concurrency slot or invoking the transfer.
    #[must_use]
    pub fn with_eligibility<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.eligibility = Arc::new(predicate);
        self
    }

    /// Starts transferring `items` with at most `concurrency` transfers in flight.
    ///
    /// Outcomes arrive on the returned stream in completion order. Must be
    /// called from within a Tokio runtime.
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub fn dispatch(&self, items: Vec<T>, concurrency: i64) -> OutcomeStream<T> {
        if items.is_empty() {
            debug!("nothing to dispatch");
            return OutcomeStream::empty();
        }

        let concurrency = effective_concurrency(concurrency, items.len());
        let (tx, rx) = mpsc::channel(concurrency);
        let cancel = CancellationToken::new();

        info!(concurrency, "starting dispatch");

        let admission = Admission {
            transfer: Arc::clone(&self.transfer),
            eligibility: Arc::clone(&self.eligibility),
            semaphore: Arc::new(Semaphore::new(concurrency)),
            tx,
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(admission.run(items));

        OutcomeStream::new(rx, cancel, handle, concurrency)
    }
}

/// State owned by the admission task for one dispatch session.
struct Admission<T: WorkItem> {
    transfer: Arc<dyn Transfer<T>>,
    eligibility: Eligibility<T>,
    semaphore: Arc<Semaphore>,
    tx: mpsc::Sender<Outcome<T>>,
    cancel: CancellationToken,
}

impl<T: WorkItem> Admission<T> {
    async fn run(self, items: Vec<T>) {
        let total = items.len();
        let mut tasks = JoinSet::new();
        let mut admitted = 0usize;
        let mut ineligible = 0usize;

        for item in items {
            if self.cancel.is_cancelled() {
                debug!("consumer stopped; no further items admitted");
                break;
            }

            if let Some(reason) = (self.eligibility)(&item) {
                debug!(item_id = item.id(), %reason, "item not eligible");
                ineligible += 1;
                deliver(&self.tx, &self.cancel, Outcome::skipped(item, reason)).await;
                continue;
            }

            // Blocks while all slots are taken.
            let permit = tokio::select! {
                biased;
                () = self.cancel.cancelled() => None,
                permit = Arc::clone(&self.semaphore).acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                debug!("admission stopped while waiting for a slot");
                break;
            };

            let transfer = Arc::clone(&self.transfer);
            let tx = self.tx.clone();
            let cancel = self.cancel.clone();
            tasks.spawn(async move {
                let outcome = run_transfer(transfer.as_ref(), item).await;
                deliver(&tx, &cancel, outcome).await;
                drop(permit);
            });
            admitted += 1;
            reap_finished(&mut tasks);
        }

        debug!(
            total,
            admitted,
            ineligible,
            running = tasks.len(),
            "admission finished, waiting for transfers"
        );

        while let Some(joined) = tasks.join_next().await {
            log_join_error(joined);
        }

        debug!("all transfer tasks finished");
        // `self.tx` drops here, after the last producer.
    }
}

/// Joins tasks that have already finished without waiting on the rest.
///
/// Returns how many were reaped.
fn reap_finished(tasks: &mut JoinSet<()>) -> usize {
    let mut reaped = 0;
    while let Some(joined) = tasks.try_join_next() {
        log_join_error(joined);
        reaped += 1;
    }
    reaped
}

fn log_join_error(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        warn!(error = %e, "transfer task terminated abnormally");
    }
}

/// Runs one transfer, converting a panic into a failed outcome.
async fn run_transfer<T: WorkItem>(transfer: &dyn Transfer<T>, item: T) -> Outcome<T> {
    debug!(item_id = item.id(), "transfer started");
    match AssertUnwindSafe(transfer.transfer(&item)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(item_id = item.id(), %message, "transfer panicked");
            Outcome::failed(item, format!("transfer panicked: {message}"))
        }
    }
}

/// Hands an outcome to the consumer, giving up if the session is cancelled.
///
/// Returns whether the outcome was delivered.
async fn deliver<T>(
    tx: &mpsc::Sender<Outcome<T>>,
    cancel: &CancellationToken,
    outcome: Outcome<T>,
) -> bool {
    tokio::select! {
        sent = tx.send(outcome) => sent.is_ok(),
        () = cancel.cancelled() => false,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
