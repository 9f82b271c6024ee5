//! Provisioning subsystem.
//!
//! # Data Flow
//! ```text
//! CLI arguments / library caller
//!     → operations.rs (typed request per adapter, one remote call each)
//!     → resilience::RetryInvoker (bounded attempts)
//!     → workflow.rs (ordered multi-step runs, halt on first failure)
//! ```

pub mod operations;
pub mod workflow;

pub use operations::{
    CreateGroup, CreateMember, CreateUser, FindGroup, FindUser, ListGroupMembers, PasswordPolicy,
    RemoveUser, UpdateUserRole,
};
pub use workflow::{onboard, Onboarded, Onboarding, WorkflowError};
