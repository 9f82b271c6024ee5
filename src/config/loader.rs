//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProvisionerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `gitlab.url`.
pub const URL_ENV_VAR: &str = "GITLAB_URL";
/// Environment variable overriding `gitlab.token`.
pub const TOKEN_ENV_VAR: &str = "GITLAB_TOKEN";
/// Environment variable overriding `users.password`.
pub const PASSWORD_ENV_VAR: &str = "GITLAB_INITIAL_PASSWORD";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML file without applying overrides or validation.
pub fn read_config(path: &Path) -> Result<ProvisionerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load configuration in precedence order and validate the result once.
///
/// The file (or the defaults when `path` is `None`) is read first, then the
/// environment is applied, then `overrides` (command-line flags).
pub fn load_config<F>(path: Option<&Path>, overrides: F) -> Result<ProvisionerConfig, ConfigError>
where
    F: FnOnce(&mut ProvisionerConfig),
{
    load_with(path, |key| std::env::var(key).ok(), overrides)
}

fn load_with<L, F>(
    path: Option<&Path>,
    lookup: L,
    overrides: F,
) -> Result<ProvisionerConfig, ConfigError>
where
    L: Fn(&str) -> Option<String>,
    F: FnOnce(&mut ProvisionerConfig),
{
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ProvisionerConfig::default(),
    };
    apply_overrides(&mut config, lookup);
    overrides(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply `GITLAB_URL`, `GITLAB_TOKEN` and `GITLAB_INITIAL_PASSWORD`.
pub fn apply_env_overrides(config: &mut ProvisionerConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Apply overrides from an arbitrary lookup. Empty values are ignored.
pub fn apply_overrides<F>(config: &mut ProvisionerConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

    if let Some(url) = lookup(URL_ENV_VAR) {
        config.gitlab.url = url;
    }
    if let Some(token) = lookup(TOKEN_ENV_VAR) {
        config.gitlab.token = token;
    }
    if let Some(password) = lookup(PASSWORD_ENV_VAR) {
        config.users.password = Some(password);
    }
}
