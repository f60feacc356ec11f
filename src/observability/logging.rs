//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Pick the output format for the environment
//!
//! # Design Decisions
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` wins over the configured level when set

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Environment, LogFormat, ObservabilityConfig};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("failed to install subscriber: {0}")]
    Install(String),
}

/// Directive used when neither `RUST_LOG` nor the config sets a level.
fn default_directive(level: &str) -> String {
    format!("locale_gatekeeper={level},gatekeeper_cli={level},tower_http={level}")
}

/// Build the filter: `RUST_LOG` if present, else the configured level.
pub fn build_filter(config: &ObservabilityConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directive = default_directive(&config.log_level);
    EnvFilter::try_new(&directive).map_err(|e| LoggingError::Filter {
        filter: directive,
        reason: e.to_string(),
    })
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(
    config: &ObservabilityConfig,
    environment: Environment,
) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;
    let format = config.effective_format(environment);

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
    };
    result.map_err(|e| LoggingError::Install(e.to_string()))?;

    tracing::debug!(format = ?format, level = %config.log_level, "Logging initialized");
    Ok(())
}
