//! Bounded retry invocation.
//!
//! # Responsibilities
//! - Run a remote operation against a connection handle
//! - Absorb classified platform failures up to an attempt bound
//! - Report aggregate success/failure alongside the last result
//!
//! # Attempt Loop
//! ```text
//! budget = retry enabled ? max_attempts (must be > 0) : 1
//! while budget > 0:
//!     Ok(non-empty)       → stop, (true, value)
//!     Ok(empty)           → observe, budget -= 1
//!     Err(classified)     → observe, budget -= 1
//!     Err(unclassified)   → propagate immediately
//! exhausted               → (false, last value if any)
//! ```
//!
//! # Design Decisions
//! - No delay between attempts
//! - Empty results count as failed attempts; a legitimate id 0 is indistinguishable
//!   from "no result"
//! - Operations are not assumed idempotent: a create whose response is lost may be
//!   applied twice on retry

use async_trait::async_trait;
use thiserror::Error;

use crate::config::schema::RetryConfig;
use crate::gitlab::{GitlabError, GitlabResult, GroupId, MemberId, UserId};
use crate::resilience::observer::{RetryObserver, TracingObserver};

/// A single remote call that the invoker can repeat.
///
/// `C` is the connection handle the call runs against.
#[async_trait]
pub trait RemoteOperation<C: ?Sized + Sync>: Send + Sync {
    type Output: EmptyResult + Send;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn execute(&self, conn: &C) -> GitlabResult<Self::Output>;
}

/// Values the invoker treats as "no result".
pub trait EmptyResult {
    fn is_empty_result(&self) -> bool;
}

impl EmptyResult for bool {
    fn is_empty_result(&self) -> bool {
        !*self
    }
}

impl EmptyResult for u64 {
    fn is_empty_result(&self) -> bool {
        *self == 0
    }
}

impl EmptyResult for GroupId {
    fn is_empty_result(&self) -> bool {
        self.0 == 0
    }
}

impl EmptyResult for UserId {
    fn is_empty_result(&self) -> bool {
        self.0 == 0
    }
}

impl EmptyResult for MemberId {
    fn is_empty_result(&self) -> bool {
        self.0 == 0
    }
}

impl<T> EmptyResult for Option<T> {
    fn is_empty_result(&self) -> bool {
        self.is_none()
    }
}

impl<T> EmptyResult for Vec<T> {
    fn is_empty_result(&self) -> bool {
        self.is_empty()
    }
}

/// Errors that abort an invocation instead of being retried.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// Retry mode was requested with a bound of zero.
    #[error("attempt bound must be positive when retrying, got {0}")]
    InvalidAttemptBound(u32),

    /// The operation failed outside the classified set.
    #[error(transparent)]
    Unclassified(GitlabError),
}

/// Retry mode and attempt bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub enabled: bool,
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 25;

    /// Retry mode with the given bound.
    pub fn retrying(max_attempts: u32) -> Self {
        Self {
            enabled: true,
            max_attempts,
        }
    }

    /// Exactly one attempt.
    pub fn single_attempt() -> Self {
        Self {
            enabled: false,
            max_attempts: 1,
        }
    }

    /// Number of attempts this policy allows.
    pub fn attempt_budget(&self) -> Result<u32, InvokeError> {
        if !self.enabled {
            return Ok(1);
        }
        if self.max_attempts == 0 {
            return Err(InvokeError::InvalidAttemptBound(self.max_attempts));
        }
        Ok(self.max_attempts)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::retrying(Self::DEFAULT_MAX_ATTEMPTS)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            enabled: config.enabled,
            max_attempts: config.max_attempts,
        }
    }
}

/// Result of an invocation: pass/fail plus the last value produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOutcome<T> {
    pub success: bool,
    pub result: Option<T>,
}

impl<T> RetryOutcome<T> {
    pub fn succeeded(value: T) -> Self {
        Self {
            success: true,
            result: Some(value),
        }
    }

    pub fn failed(last: Option<T>) -> Self {
        Self {
            success: false,
            result: last,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The value, only if the invocation succeeded.
    pub fn into_success(self) -> Option<T> {
        if self.success {
            self.result
        } else {
            None
        }
    }

    pub fn into_parts(self) -> (bool, Option<T>) {
        (self.success, self.result)
    }
}

/// Runs operations under a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct RetryInvoker<O = TracingObserver> {
    policy: RetryPolicy,
    observer: O,
}

impl RetryInvoker<TracingObserver> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_observer(policy, TracingObserver)
    }
}

impl<O: RetryObserver> RetryInvoker<O> {
    pub fn with_observer(policy: RetryPolicy, observer: O) -> Self {
        Self { policy, observer }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Invoke `op` against `conn` until it succeeds or the budget runs out.
    ///
    /// Exhausting the budget is reported as `Ok` with `success == false`.
    /// An invalid bound is rejected before the operation is called.
    pub async fn invoke<C, Op>(
        &self,
        op: &Op,
        conn: &C,
    ) -> Result<RetryOutcome<Op::Output>, InvokeError>
    where
        C: ?Sized + Sync,
        Op: RemoteOperation<C> + ?Sized,
    {
        let budget = self.policy.attempt_budget()?;
        let mut left = budget;
        let mut attempt = 0;
        let mut last = None;

        while left > 0 {
            attempt += 1;
            match op.execute(conn).await {
                Ok(value) if !value.is_empty_result() => {
                    tracing::debug!(operation = op.name(), attempt, "Operation succeeded");
                    return Ok(RetryOutcome::succeeded(value));
                }
                Ok(value) => {
                    self.observer.on_empty_result(op.name(), attempt, budget);
                    last = Some(value);
                }
                Err(err) if err.classified().is_some() => {
                    self.observer
                        .on_classified_failure(op.name(), attempt, budget, &err);
                }
                Err(err) => return Err(InvokeError::Unclassified(err)),
            }
            left -= 1;
        }

        tracing::warn!(operation = op.name(), attempts = attempt, "Attempt budget exhausted");
        Ok(RetryOutcome::failed(last))
    }
}
