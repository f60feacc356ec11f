//! Locale subsystem.
//!
//! # Data Flow
//! ```text
//! [locales] config
//!     → registry.rs (allow-list, default, LocaleCode minting)
//!
//! RequestDescriptor
//!     → resolver.rs (path → cookie → Accept-Language → default)
//!     → security/sanitizer.rs (every candidate)
//!     → registry.rs (membership)
//!     → LocaleCode
//! ```
//!
//! # Design Decisions
//! - A `LocaleCode` can only come out of the registry, never from raw input
//! - Resolution is pure and total

pub mod registry;
pub mod resolver;

pub use registry::{is_locale_shaped, LocaleCode, LocaleRegistry, RegistryError};
pub use resolver::{primary_language, LocaleResolver, LocaleSource, ResolvedLocale};
