//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempt bound > 0, timeout > 0)
//! - Check the endpoint and credentials are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProvisionerConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use url::Url;

use crate::config::schema::ProvisionerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("gitlab.url '{url}' is invalid: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("gitlab.token is empty (set GITLAB_TOKEN)")]
    MissingToken,

    #[error("gitlab.timeout_secs must be greater than 0")]
    ZeroTimeout,

    #[error("retry.max_attempts must be greater than 0 when retries are enabled")]
    ZeroAttempts,

    #[error("logging.level '{0}' is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProvisionerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.gitlab.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::InvalidUrl {
            url: config.gitlab.url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidUrl {
            url: config.gitlab.url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.gitlab.token.trim().is_empty() {
        errors.push(ValidationError::MissingToken);
    }

    if config.gitlab.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.retry.enabled && config.retry.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
        errors.push(ValidationError::UnknownLogLevel(config.logging.level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
