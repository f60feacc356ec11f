//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatekeeperConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides the login attempt threshold.
pub const ENV_MAX_LOGIN_ATTEMPTS: &str = "GATEKEEPER_MAX_LOGIN_ATTEMPTS";
/// Overrides the deployment environment.
pub const ENV_ENVIRONMENT: &str = "GATEKEEPER_ENV";
/// Overrides the listener bind address.
pub const ENV_BIND_ADDRESS: &str = "GATEKEEPER_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {reason}")]
    Override { var: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatekeeperConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatekeeperConfig = toml::from_str(&content)?;
    finalize(config, |var| std::env::var(var).ok())
}

/// Build configuration from defaults plus environment overrides.
pub fn load_from_env() -> Result<GatekeeperConfig, ConfigError> {
    finalize(GatekeeperConfig::default(), |var| std::env::var(var).ok())
}

/// Apply overrides from `lookup` and validate.
pub fn finalize<F>(mut config: GatekeeperConfig, lookup: F) -> Result<GatekeeperConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    apply_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn apply_overrides<F>(config: &mut GatekeeperConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(ENV_MAX_LOGIN_ATTEMPTS) {
        config.rate_limit.max_attempts =
            raw.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError::Override {
                var: ENV_MAX_LOGIN_ATTEMPTS,
                reason: e.to_string(),
            })?;
    }

    if let Some(raw) = lookup(ENV_ENVIRONMENT) {
        config.environment = raw
            .parse()
            .map_err(|reason| ConfigError::Override { var: ENV_ENVIRONMENT, reason })?;
    }

    if let Some(raw) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = raw.trim().to_string();
    }

    Ok(())
}
