//! Locale resolution for a single request.
//!
//! # Precedence (first match wins)
//! ```text
//! 1. first path segment      /es/dashboard → es
//! 2. locale cookie           locale=es
//! 3. Accept-Language         es-ES,es;q=0.9 → es
//! 4. registry default
//! ```
//!
//! # Design Decisions
//! - Every candidate passes the sanitizer before the registry sees it
//! - Total: the default always terminates the chain
//! - Deterministic: no clock, no randomness, no shared state

use std::sync::Arc;

use axum::http::header::ACCEPT_LANGUAGE;

use crate::gatekeeper::request::RequestDescriptor;
use crate::locale::registry::{LocaleCode, LocaleRegistry};
use crate::observability::metrics;
use crate::security::sanitizer::{sanitize_locale_candidate, SanitizationVerdict};

/// Where the resolved locale came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleSource {
    Path,
    Cookie,
    AcceptLanguage,
    Default,
}

impl LocaleSource {
    pub fn as_str(self) -> &'static str {
        match self {
            LocaleSource::Path => "path",
            LocaleSource::Cookie => "cookie",
            LocaleSource::AcceptLanguage => "accept_language",
            LocaleSource::Default => "default",
        }
    }
}

/// A resolved locale together with its source.
///
/// Also inserted into request extensions for downstream handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocale {
    pub code: LocaleCode,
    pub source: LocaleSource,
}

/// Applies the precedence policy against a registry.
#[derive(Debug, Clone)]
pub struct LocaleResolver {
    registry: Arc<LocaleRegistry>,
    cookie_name: String,
}

impl LocaleResolver {
    pub fn new(registry: Arc<LocaleRegistry>, cookie_name: impl Into<String>) -> Self {
        Self {
            registry,
            cookie_name: cookie_name.into(),
        }
    }

    /// Resolve the locale for `req`.
    pub fn resolve(&self, req: &RequestDescriptor) -> LocaleCode {
        self.resolve_with_source(req).code
    }

    /// Resolve the locale for `req`, reporting which source won.
    pub fn resolve_with_source(&self, req: &RequestDescriptor) -> ResolvedLocale {
        if let Some(code) = self.path_locale(req) {
            return ResolvedLocale { code, source: LocaleSource::Path };
        }

        if let Some(code) = self.cookie_locale(req) {
            return ResolvedLocale { code, source: LocaleSource::Cookie };
        }

        if let Some(code) = req
            .header(ACCEPT_LANGUAGE)
            .and_then(primary_language)
            .and_then(|lang| self.candidate(&lang, LocaleSource::AcceptLanguage))
        {
            return ResolvedLocale { code, source: LocaleSource::AcceptLanguage };
        }

        ResolvedLocale {
            code: self.registry.default_locale(),
            source: LocaleSource::Default,
        }
    }

    /// The supported locale encoded in the first path segment, if any.
    pub fn path_locale(&self, req: &RequestDescriptor) -> Option<LocaleCode> {
        req.first_segment()
            .and_then(|segment| self.candidate(segment, LocaleSource::Path))
    }

    /// The supported locale stored in the locale cookie, if any.
    pub fn cookie_locale(&self, req: &RequestDescriptor) -> Option<LocaleCode> {
        req.cookie(&self.cookie_name)
            .and_then(|value| self.candidate(value, LocaleSource::Cookie))
    }

    fn candidate(&self, raw: &str, source: LocaleSource) -> Option<LocaleCode> {
        match sanitize_locale_candidate(raw) {
            SanitizationVerdict::Accepted { cleaned } => self.registry.lookup(&cleaned),
            SanitizationVerdict::Rejected(reason) => {
                // Never log the payload itself
                tracing::debug!(
                    event = "sanitizer_rejection",
                    source = source.as_str(),
                    reason = reason.as_str(),
                    "Locale candidate rejected"
                );
                metrics::record_sanitizer_rejection(source.as_str(), reason.as_str());
                None
            }
        }
    }
}

/// Primary subtag of the highest-quality tag in an `Accept-Language` value.
///
/// Ties keep header order. Entries with a malformed or zero quality and the
/// `*` wildcard are ignored. Returns `None` for anything unparsable.
pub fn primary_language(header: &str) -> Option<String> {
    let tag = preferred_tag(header)?;
    let primary = tag.split('-').next()?;
    if primary.is_empty() || primary.len() > 8 || !primary.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    Some(primary.to_ascii_lowercase())
}

fn preferred_tag(header: &str) -> Option<&str> {
    let mut best: Option<(&str, f32)> = None;

    'entries: for entry in header.split(',') {
        let mut parts = entry.split(';');
        let tag = parts.next().unwrap_or_default().trim();
        if tag.is_empty() || tag == "*" {
            continue;
        }

        let mut quality = 1.0_f32;
        for param in parts {
            let param = param.trim();
            let Some(value) = param.strip_prefix("q=").or_else(|| param.strip_prefix("Q=")) else {
                continue;
            };
            match value.trim().parse::<f32>() {
                Ok(q) if (0.0..=1.0).contains(&q) => quality = q,
                _ => continue 'entries,
            }
        }

        if quality <= 0.0 {
            continue;
        }
        if best.map_or(true, |(_, q)| quality > q) {
            best = Some((tag, quality));
        }
    }

    best.map(|(tag, _)| tag)
}
