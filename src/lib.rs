//! GitLab provisioning library.
//!
//! Drives the GitLab administrative REST API (groups, users, group
//! memberships) through a bounded retry invoker.

pub mod config;
pub mod gitlab;
pub mod observability;
pub mod provisioning;
pub mod resilience;

pub use config::schema::ProvisionerConfig;
pub use gitlab::{GitlabApi, GitlabClient, GitlabError};
pub use resilience::retries::{RetryInvoker, RetryOutcome, RetryPolicy};
