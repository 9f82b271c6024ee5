//! Retry observation.
//!
//! The invoker reports every absorbed attempt failure through a
//! [`RetryObserver`] it owns, so callers decide where those reports go.

use crate::gitlab::GitlabError;

/// Receives the attempt failures the retry invoker absorbs.
///
/// Called before the attempt is counted against the budget. Unclassified
/// errors are never reported here; they propagate to the caller instead.
pub trait RetryObserver: Send + Sync {
    /// A classified platform failure ended this attempt.
    fn on_classified_failure(&self, operation: &str, attempt: u32, budget: u32, error: &GitlabError);

    /// The attempt returned an empty result (id 0, `false`, nothing found).
    fn on_empty_result(&self, operation: &str, attempt: u32, budget: u32);
}

/// Default observer: one `error` event per absorbed failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RetryObserver for TracingObserver {
    fn on_classified_failure(&self, operation: &str, attempt: u32, budget: u32, error: &GitlabError) {
        tracing::error!(operation, attempt, budget, "{}", error);
    }

    fn on_empty_result(&self, operation: &str, attempt: u32, budget: u32) {
        tracing::error!(operation, attempt, budget, "Operation returned an empty result");
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for &T {
    fn on_classified_failure(&self, operation: &str, attempt: u32, budget: u32, error: &GitlabError) {
        (**self).on_classified_failure(operation, attempt, budget, error);
    }

    fn on_empty_result(&self, operation: &str, attempt: u32, budget: u32) {
        (**self).on_empty_result(operation, attempt, budget);
    }
}
