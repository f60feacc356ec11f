//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Every untrusted string bound for a header:
//!     → sanitizer.rs (reject traversal, markup, quotes, control chars)
//!
//! Every pipeline response:
//!     → headers.rs (security headers, X-Locale, locale cookie)
//!
//! Credential login handler (out of band):
//!     → rate_limit.rs (check_and_record_failure / record_success)
//! ```
//!
//! # Design Decisions
//! - Hostile input is dropped silently, never echoed
//! - The login limiter fails open on internal faults
//! - No trust in client input

pub mod headers;
pub mod rate_limit;
pub mod sanitizer;

pub use rate_limit::{LoginDecision, LoginRateLimiter};
pub use sanitizer::{sanitize_locale_candidate, SanitizationVerdict};
