//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gatekeeper.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gatekeeper.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatekeeperConfig {
    /// Deployment environment (affects cookie flags and log format).
    pub environment: Environment,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Supported locales and the fallback locale.
    pub locales: LocaleConfig,

    /// Path classification rules.
    pub routing: RoutingConfig,

    /// Static asset bypass rules.
    pub static_assets: StaticAssetConfig,

    /// Locale cookie attributes.
    pub cookie: CookieConfig,

    /// Login rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Locale allow-list.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Supported locale codes, matched exactly and case-sensitively.
    pub supported: Vec<String>,

    /// Locale used when no request source yields a supported code.
    pub default: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            supported: vec!["en".to_string(), "es".to_string()],
            default: "en".to_string(),
        }
    }
}

/// Path classification.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Prefixes that are decorated and forwarded but never locale-prefixed.
    pub unlocalized_prefixes: Vec<String>,

    /// Localized page that auth errors are redirected to.
    pub auth_error_page: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            unlocalized_prefixes: vec!["/api/".to_string()],
            auth_error_page: "/auth/error".to_string(),
        }
    }
}

/// Static asset bypass rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticAssetConfig {
    /// Path prefixes served untouched.
    pub prefixes: Vec<String>,

    /// File extensions (without the dot) served untouched.
    pub extensions: Vec<String>,
}

impl Default for StaticAssetConfig {
    fn default() -> Self {
        Self {
            prefixes: vec!["/_next/".to_string()],
            extensions: [
                "ico", "png", "jpg", "jpeg", "gif", "svg", "webp", "css", "js", "txt", "xml",
                "map", "woff", "woff2",
            ]
            .iter()
            .map(|e| e.to_string())
            .collect(),
        }
    }
}

/// Locale cookie attributes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Cookie name read by the resolver and written by the decorator.
    pub name: String,

    /// Max-Age in seconds.
    pub max_age_secs: u64,

    /// Cookie path.
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "locale".to_string(),
            max_age_secs: 2 * 365 * 24 * 60 * 60,
            path: "/".to_string(),
        }
    }
}

/// Login rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Failed attempts tolerated per identity within one window.
    pub max_attempts: u32,

    /// Window length in seconds.
    pub window_secs: u64,

    /// Maximum number of identities tracked at once (LRU bound).
    pub capacity: usize,

    /// Interval between expired-record sweeps in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            window_secs: 60,
            capacity: 1000,
            sweep_interval_secs: 60,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format. When unset, JSON in production and pretty otherwise.
    pub log_format: Option<LogFormat>,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: None,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Effective log format for the given environment.
    pub fn effective_format(&self, environment: Environment) -> LogFormat {
        self.log_format.unwrap_or(if environment.is_production() {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        })
    }
}
