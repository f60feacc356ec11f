//! Locale gatekeeper library.
//!
//! Edge middleware that runs before page routing: it assigns every request a
//! supported locale, redirects unlocalized page paths, rewrites auth provider
//! errors to a localized error page, and decorates responses with security
//! headers and a locale cookie. A standalone login rate limiter is provided
//! for the credential login handler.

// Core subsystems
pub mod config;
pub mod gatekeeper;
pub mod http;
pub mod locale;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::GatekeeperConfig;
pub use gatekeeper::{GateAction, GateOutcome, Gatekeeper, RequestDescriptor, ResponseDescriptor};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use locale::{LocaleCode, LocaleRegistry, LocaleResolver};
pub use security::{LoginDecision, LoginRateLimiter};
