//! GitLab integration subsystem.
//!
//! # Data Flow
//! ```text
//! ProvisionerConfig.gitlab (url, token from environment)
//!     → client.rs (authenticated reqwest session, /api/v4)
//!     → api.rs (GitlabApi capability trait consumed by operations)
//!     → types.rs (records, request bodies, classified errors)
//! ```
//!
//! # Security Constraints
//! - Access tokens come from configuration or environment, never source
//! - Tokens and passwords are never logged

pub mod api;
pub mod client;
pub mod types;

pub use api::{Connection, GitlabApi};
pub use client::GitlabClient;
pub use types::{
    AccessLevel, GitlabError, GitlabResult, Group, GroupId, Member, MemberId, RemoteFailureKind,
    User, UserId,
};
