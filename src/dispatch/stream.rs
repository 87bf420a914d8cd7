//! Consumer side of a dispatch session.

use std::ops::ControlFlow;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::outcome::Outcome;

/// Lazy, single-pass sequence of outcomes from one dispatch call.
///
/// Pulling with [`recv`](Self::recv) waits for the next completed transfer.
/// Stopping early is done with [`close`](Self::close), which returns only
/// after every spawned transfer task has terminated. Dropping the stream
/// without closing it stops admission too, but does not wait for transfers
/// that are already running.
#[derive(Debug)]
pub struct OutcomeStream<T> {
    rx: mpsc::Receiver<Outcome<T>>,
    cancel: CancellationToken,
    admission: Option<JoinHandle<()>>,
    concurrency: usize,
}

impl<T> OutcomeStream<T> {
    pub(crate) fn new(
        rx: mpsc::Receiver<Outcome<T>>,
        cancel: CancellationToken,
        admission: JoinHandle<()>,
        concurrency: usize,
    ) -> Self {
        Self {
            rx,
            cancel,
            admission: Some(admission),
            concurrency,
        }
    }

    /// A stream that is already exhausted; no session, no tasks.
    pub(crate) fn empty() -> Self {
        let (_, rx) = mpsc::channel(1);
        Self {
            rx,
            cancel: CancellationToken::new(),
            admission: None,
            concurrency: 0,
        }
    }

    /// Effective concurrency of this session (0 for an empty dispatch).
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Waits for the next outcome, or `None` once every item is accounted for.
    pub async fn recv(&mut self) -> Option<Outcome<T>> {
        self.rx.recv().await
    }

    /// Stops the session early and waits for in-flight transfers.
    ///
    /// No further items are admitted. Transfers that already started run to
    /// completion; their outcomes are discarded.
    pub async fn close(mut self) {
        self.shutdown().await;
    }

    /// Feeds outcomes to `f` until it breaks or the stream is exhausted,
    /// then closes the session.
    pub async fn for_each_until<F>(mut self, mut f: F)
    where
        F: FnMut(Outcome<T>) -> ControlFlow<()>,
    {
        while let Some(outcome) = self.rx.recv().await {
            if f(outcome).is_break() {
                debug!("consumer stopped early");
                break;
            }
        }
        self.shutdown().await;
    }

    /// Drains every outcome into a vector.
    pub async fn collect_all(mut self) -> Vec<Outcome<T>> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.rx.recv().await {
            outcomes.push(outcome);
        }
        self.shutdown().await;
        outcomes
    }

    async fn shutdown(&mut self) {
        let Some(admission) = self.admission.take() else {
            return;
        };

        self.cancel.cancel();
        self.rx.close();

        let mut discarded = 0usize;
        while self.rx.recv().await.is_some() {
            discarded += 1;
        }

        if let Err(e) = admission.await {
            warn!(error = %e, "admission task terminated abnormally");
        }

        debug!(discarded, "dispatch session closed");
    }
}

impl<T> Drop for OutcomeStream<T> {
    fn drop(&mut self) {
        let Some(admission) = &self.admission else {
            return;
        };
        self.cancel.cancel();
        if !admission.is_finished() {
            debug!("dispatch session dropped with transfers still running; not waiting for them");
        }
    }
}

/// Pull-based access for `StreamExt` combinators.
///
/// Breaking out of a `while let Some(_) = stream.next().await` loop and
/// dropping the stream only cancels admission: transfers already running
/// finish in the background. Call [`OutcomeStream::close`] afterwards (or
/// use [`OutcomeStream::for_each_until`]) to wait for them.
impl<T> Stream for OutcomeStream<T> {
    type Item = Outcome<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
