//! Per-item results produced by the dispatcher.

use std::fmt;

/// Reason attached to items whose destination is already on disk.
pub const ALREADY_DOWNLOADED: &str = "already downloaded";

/// Reason attached to media items that carry no MIME type.
pub const NO_MIME_TYPE: &str = "no mime type";

/// A unit of work that can be handed to the dispatcher.
///
/// Only the identity is needed by the dispatcher itself; everything else is
/// opaque and only read by the [`Transfer`](super::Transfer) implementation.
pub trait WorkItem: Clone + Send + Sync + 'static {
    /// Returns the unique identity of this item, used in logs.
    fn id(&self) -> &str;
}

/// Classified result for exactly one submitted work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The item was transferred and is in place.
    Success {
        /// The item that was transferred.
        item: T,
    },
    /// The item was not transferred, and that is not an error.
    Skipped {
        /// The skipped item.
        item: T,
        /// Why it was skipped (e.g. [`ALREADY_DOWNLOADED`]).
        reason: String,
    },
    /// The transfer was attempted or prepared and failed.
    Failed {
        /// The failed item.
        item: T,
        /// Rendered error description.
        error: String,
    },
}

impl<T> Outcome<T> {
    /// Creates a success outcome.
    pub fn success(item: T) -> Self {
        Self::Success { item }
    }

    /// Creates a skipped outcome.
    pub fn skipped(item: T, reason: impl Into<String>) -> Self {
        Self::Skipped {
            item,
            reason: reason.into(),
        }
    }

    /// Creates a failed outcome from anything displayable.
    pub fn failed(item: T, error: impl fmt::Display) -> Self {
        Self::Failed {
            item,
            error: error.to_string(),
        }
    }

    /// Returns the item this outcome belongs to.
    #[must_use]
    pub fn item(&self) -> &T {
        match self {
            Self::Success { item } | Self::Skipped { item, .. } | Self::Failed { item, .. } => item,
        }
    }

    /// Consumes the outcome, returning its item.
    #[must_use]
    pub fn into_item(self) -> T {
        match self {
            Self::Success { item } | Self::Skipped { item, .. } | Self::Failed { item, .. } => item,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns the skip reason, if this is a skipped outcome.
    #[must_use]
    pub fn skip_reason(&self) -> Option<&str> {
        match self {
            Self::Skipped { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Returns the error description, if this is a failed outcome.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Running tally of outcomes, used for end-of-run summaries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeTally {
    /// Items transferred successfully.
    pub succeeded: usize,
    /// Items skipped (already present or ineligible).
    pub skipped: usize,
    /// Items that failed.
    pub failed: usize,
}

impl OutcomeTally {
    /// Records one outcome.
    pub fn record<T>(&mut self, outcome: &Outcome<T>) {
        match outcome {
            Outcome::Success { .. } => self.succeeded += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Total number of outcomes recorded.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let ok = Outcome::success("a");
        assert!(ok.is_success());
        assert_eq!(*ok.item(), "a");
        assert_eq!(ok.skip_reason(), None);

        let skipped = Outcome::skipped("b", ALREADY_DOWNLOADED);
        assert!(skipped.is_skipped());
        assert_eq!(skipped.skip_reason(), Some("already downloaded"));

        let failed = Outcome::failed("c", "HTTP 500 downloading x");
        assert!(failed.is_failed());
        assert_eq!(failed.error(), Some("HTTP 500 downloading x"));
        assert_eq!(failed.into_item(), "c");
    }

    #[test]
    fn test_tally_counts_each_kind() {
        let mut tally = OutcomeTally::default();
        tally.record(&Outcome::success(1));
        tally.record(&Outcome::success(2));
        tally.record(&Outcome::skipped(3, NO_MIME_TYPE));
        tally.record(&Outcome::failed(4, "boom"));

        assert_eq!(tally.succeeded, 2);
        assert_eq!(tally.skipped, 1);
        assert_eq!(tally.failed, 1);
        assert_eq!(tally.total(), 4);
    }
}
