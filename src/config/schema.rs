//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the provisioner.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the provisioner.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProvisionerConfig {
    /// GitLab endpoint and credentials.
    pub gitlab: GitlabConfig,

    /// Retry configuration.
    pub retry: RetryConfig,

    /// Defaults applied to newly created users.
    pub users: UsersConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

/// GitLab connection configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitlabConfig {
    /// Instance base URL (e.g., "https://gitlab.example.com").
    pub url: String,

    /// Personal access token with `api` scope. Prefer `GITLAB_TOKEN`.
    pub token: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub use_proxy: bool,
}

impl Default for GitlabConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost".to_string(),
            token: String::new(),
            timeout_secs: 30,
            use_proxy: true,
        }
    }
}

impl std::fmt::Debug for GitlabConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitlabConfig")
            .field("url", &self.url)
            .field("token", &if self.token.is_empty() { "<unset>" } else { "<redacted>" })
            .field("timeout_secs", &self.timeout_secs)
            .field("use_proxy", &self.use_proxy)
            .finish()
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries. When disabled every operation is attempted once.
    pub enabled: bool,

    /// Maximum number of attempts per operation.
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 25,
        }
    }
}

/// Password policy for created users.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UsersConfig {
    /// Initial password. Prefer `GITLAB_INITIAL_PASSWORD`.
    pub password: Option<String>,

    /// Send a password reset link to the new user.
    pub reset_password: bool,

    /// Let GitLab pick a random password.
    pub force_random_password: bool,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            password: None,
            reset_password: false,
            force_random_password: false,
        }
    }
}

impl std::fmt::Debug for UsersConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsersConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("reset_password", &self.reset_password)
            .field("force_random_password", &self.force_random_password)
            .finish()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// Optional file that receives a copy of every log line.
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
