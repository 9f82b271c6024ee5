//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (GITLAB_URL, GITLAB_TOKEN, GITLAB_INITIAL_PASSWORD)
//!     → command-line overrides (binary only)
//!     → validation.rs (semantic checks)
//!     → ProvisionerConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Credentials never live in source; the file or environment supplies them
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::GitlabConfig;
pub use schema::LoggingConfig;
pub use schema::ProvisionerConfig;
pub use schema::RetryConfig;
pub use schema::UsersConfig;
