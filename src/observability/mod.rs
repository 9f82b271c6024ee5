//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! operations, invoker, client
//!     → tracing events (structured fields: ids, attempt, budget)
//!     → logging.rs subscriber
//!     → stderr (+ optional log file)
//! ```
//!
//! # Design Decisions
//! - Structured fields for every id an operation produces
//! - Secrets (tokens, passwords) are never recorded

pub mod logging;

pub use logging::{init_logging, LoggingError};
