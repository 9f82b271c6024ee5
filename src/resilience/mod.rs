//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Caller builds an operation (typed request)
//!     → retries.rs (RetryInvoker: bounded attempts, classified failures only)
//!     → operation executes one remote call on the connection handle
//!     → observer.rs (absorbed failures reported before the next attempt)
//!     → RetryOutcome (success flag + last result)
//! ```
//!
//! # Design Decisions
//! - Retries are immediate; timeouts belong to the HTTP transport
//! - Only the closed set of platform failure kinds is retried
//! - Exhaustion is an outcome, not an error

pub mod observer;
pub mod retries;

pub use observer::{RetryObserver, TracingObserver};
pub use retries::{EmptyResult, InvokeError, RemoteOperation, RetryInvoker, RetryOutcome, RetryPolicy};
