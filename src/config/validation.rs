//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (default locale is a supported locale)
//! - Validate value ranges (window > 0, capacity > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatekeeperConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatekeeperConfig;
use crate::security::sanitizer::{is_header_safe, sanitize_locale_candidate};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("locales.supported must not be empty")]
    NoLocales,

    #[error("default locale '{0}' is not in locales.supported")]
    DefaultNotSupported(String),

    #[error("locale code '{0}' is not a valid locale code")]
    InvalidLocaleCode(String),

    #[error("locale code '{0}' is listed more than once")]
    DuplicateLocale(String),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} entry '{value}' must start with '/'")]
    InvalidPrefix { field: &'static str, value: String },

    #[error("{field} '{value}' is not safe to place in a header")]
    UnsafeHeaderValue { field: &'static str, value: String },

    #[error("cookie.name '{0}' is not a valid cookie name")]
    InvalidCookieName(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatekeeperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_locales(config, &mut errors);

    let limits = &config.rate_limit;
    if limits.max_attempts == 0 {
        errors.push(ValidationError::Zero { field: "rate_limit.max_attempts" });
    }
    if limits.window_secs == 0 {
        errors.push(ValidationError::Zero { field: "rate_limit.window_secs" });
    }
    if limits.capacity == 0 {
        errors.push(ValidationError::Zero { field: "rate_limit.capacity" });
    }
    if limits.sweep_interval_secs == 0 {
        errors.push(ValidationError::Zero { field: "rate_limit.sweep_interval_secs" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }

    check_address("listener.bind_address", &config.listener.bind_address, &mut errors);
    if config.observability.metrics_enabled {
        check_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    check_prefixes("routing.unlocalized_prefixes", &config.routing.unlocalized_prefixes, &mut errors);
    check_prefixes("static_assets.prefixes", &config.static_assets.prefixes, &mut errors);
    check_path("routing.auth_error_page", &config.routing.auth_error_page, &mut errors);
    check_path("cookie.path", &config.cookie.path, &mut errors);

    let cookie_name = &config.cookie.name;
    if cookie_name.is_empty() || !cookie_name.bytes().all(is_cookie_token_byte) {
        errors.push(ValidationError::InvalidCookieName(cookie_name.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_locales(config: &GatekeeperConfig, errors: &mut Vec<ValidationError>) {
    let locales = &config.locales;
    if locales.supported.is_empty() {
        errors.push(ValidationError::NoLocales);
    }

    let mut seen = HashSet::new();
    for code in &locales.supported {
        if !is_well_formed_code(code) {
            errors.push(ValidationError::InvalidLocaleCode(code.clone()));
        }
        if !seen.insert(code.as_str()) {
            errors.push(ValidationError::DuplicateLocale(code.clone()));
        }
    }

    if !locales.supported.iter().any(|c| c == &locales.default) {
        errors.push(ValidationError::DefaultNotSupported(locales.default.clone()));
    }
}

/// Locale codes end up in headers and cookies, so they must survive the
/// sanitizer unchanged and stay within `[A-Za-z0-9-]`.
fn is_well_formed_code(code: &str) -> bool {
    !code.is_empty()
        && code.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        && !sanitize_locale_candidate(code).is_rejected()
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

/// A path that is written into `Location` or `Set-Cookie`.
fn check_path(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if !value.starts_with('/') {
        errors.push(ValidationError::InvalidPrefix {
            field,
            value: value.to_string(),
        });
    } else if !is_header_safe(value) || value.contains(';') {
        errors.push(ValidationError::UnsafeHeaderValue {
            field,
            value: value.to_string(),
        });
    }
}

/// RFC 6265 cookie-name: a token, no separators.
fn is_cookie_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

fn check_prefixes(field: &'static str, prefixes: &[String], errors: &mut Vec<ValidationError>) {
    for prefix in prefixes {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPrefix {
                field,
                value: prefix.clone(),
            });
        }
    }
}
