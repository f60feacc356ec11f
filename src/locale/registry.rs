//! Supported locale allow-list.
//!
//! # Responsibilities
//! - Hold the fixed set of supported locale codes and the default
//! - Answer membership queries (exact, case-sensitive)
//! - Mint `LocaleCode` values; nothing else can construct one
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Construction is the only fallible step and happens at startup

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::config::LocaleConfig;

/// A locale code that is a member of the registry it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocaleCode(Arc<str>);

impl LocaleCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocaleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LocaleCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for LocaleCode {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for LocaleCode {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// True when `segment` has the shape of a locale code (`xx`, `xx-YY`,
/// `xx-419`) regardless of whether it is supported.
pub fn is_locale_shaped(segment: &str) -> bool {
    let (language, region) = match segment.split_once('-') {
        Some((language, region)) => (language, Some(region)),
        None => (segment, None),
    };
    let language_ok = language.len() == 2 && language.bytes().all(|b| b.is_ascii_alphabetic());
    let region_ok = match region {
        None => true,
        Some(r) => {
            (r.len() == 2 && r.bytes().all(|b| b.is_ascii_alphabetic()))
                || (r.len() == 3 && r.bytes().all(|b| b.is_ascii_digit()))
        }
    };
    language_ok && region_ok
}

/// Errors building a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("locale registry needs at least one supported locale")]
    Empty,

    #[error("default locale '{0}' is not a supported locale")]
    DefaultNotSupported(String),
}

/// The allow-list of supported locales plus the fallback.
#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    supported: Vec<LocaleCode>,
    index: HashSet<Arc<str>>,
    default: LocaleCode,
}

impl LocaleRegistry {
    /// Create a registry. Duplicate codes are collapsed.
    pub fn new<I, S>(supported: I, default: &str) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut codes = Vec::new();
        let mut index = HashSet::new();
        for code in supported {
            let code: Arc<str> = Arc::from(code.as_ref());
            if index.insert(code.clone()) {
                codes.push(LocaleCode(code));
            }
        }

        if codes.is_empty() {
            return Err(RegistryError::Empty);
        }

        let default = codes
            .iter()
            .find(|c| c.as_str() == default)
            .cloned()
            .ok_or_else(|| RegistryError::DefaultNotSupported(default.to_string()))?;

        Ok(Self {
            supported: codes,
            index,
            default,
        })
    }

    /// Build from the `[locales]` config section.
    pub fn from_config(config: &LocaleConfig) -> Result<Self, RegistryError> {
        Self::new(&config.supported, &config.default)
    }

    /// Exact, case-sensitive membership test.
    pub fn is_valid(&self, code: &str) -> bool {
        self.index.contains(code)
    }

    /// The registry's own `LocaleCode` for `code`, if supported.
    pub fn lookup(&self, code: &str) -> Option<LocaleCode> {
        self.index.get(code).map(|c| LocaleCode(c.clone()))
    }

    pub fn default_locale(&self) -> LocaleCode {
        self.default.clone()
    }

    /// Supported codes in configuration order.
    pub fn supported(&self) -> &[LocaleCode] {
        &self.supported
    }
}
