//! The gatekeeper pipeline.
//!
//! # Order
//! ```text
//! static asset?        → Bypass (no headers at all)
//! auth path + ?error   → 307 /{locale}/auth/error?error=...
//! resolve locale
//! path has a locale or
//!   is unlocalized?    → Forward
//! otherwise            → 307 /{locale}/{clean path}
//! decorate (all but Bypass)
//! ```
//!
//! # Design Decisions
//! - Pure per request: no shared mutable state, no I/O, safe to run in parallel
//! - Total: every input yields a well-formed outcome, never a panic or 5xx

use std::sync::Arc;

use crate::config::GatekeeperConfig;
use crate::gatekeeper::auth_error::AuthErrorDetector;
use crate::gatekeeper::redirect::localized_location;
use crate::gatekeeper::request::RequestDescriptor;
use crate::gatekeeper::response::ResponseDescriptor;
use crate::gatekeeper::static_assets::StaticAssetMatcher;
use crate::locale::{LocaleRegistry, LocaleResolver, LocaleSource, RegistryError, ResolvedLocale};
use crate::observability::metrics;
use crate::security::headers::ResponseDecorator;

/// What the HTTP layer should do with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    /// Forward untouched.
    Bypass,
    /// Forward, then merge the decorated headers into the downstream response.
    Forward,
    /// Answer with the redirect; the downstream handler never runs.
    Redirect,
}

/// Result of one pipeline pass.
#[derive(Debug, Clone)]
pub struct GateOutcome {
    pub action: GateAction,
    pub response: ResponseDescriptor,
    /// Resolved locale; `None` only for `Bypass`.
    pub locale: Option<ResolvedLocale>,
}

impl GateOutcome {
    fn bypass() -> Self {
        Self {
            action: GateAction::Bypass,
            response: ResponseDescriptor::pass_through(),
            locale: None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "action": match self.action {
                GateAction::Bypass => "bypass",
                GateAction::Forward => "forward",
                GateAction::Redirect => "redirect",
            },
            "locale": self.locale.as_ref().map(|l| l.code.to_string()),
            "locale_source": self.locale.as_ref().map(|l| l.source.as_str()),
            "response": self.response.to_json(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Gatekeeper {
    resolver: LocaleResolver,
    auth_errors: AuthErrorDetector,
    decorator: ResponseDecorator,
    static_assets: StaticAssetMatcher,
    unlocalized_prefixes: Vec<String>,
}

impl Gatekeeper {
    pub fn new(
        resolver: LocaleResolver,
        auth_errors: AuthErrorDetector,
        decorator: ResponseDecorator,
        static_assets: StaticAssetMatcher,
        unlocalized_prefixes: Vec<String>,
    ) -> Self {
        Self {
            resolver,
            auth_errors,
            decorator,
            static_assets,
            unlocalized_prefixes,
        }
    }

    pub fn from_config(config: &GatekeeperConfig) -> Result<Self, RegistryError> {
        let registry = Arc::new(LocaleRegistry::from_config(&config.locales)?);
        Ok(Self::new(
            LocaleResolver::new(registry, config.cookie.name.clone()),
            AuthErrorDetector::new(config.routing.auth_error_page.clone()),
            ResponseDecorator::from_config(config),
            StaticAssetMatcher::from_config(&config.static_assets),
            config.routing.unlocalized_prefixes.clone(),
        ))
    }

    /// Run the pipeline for one request.
    pub fn evaluate(&self, req: &RequestDescriptor) -> GateOutcome {
        if self.static_assets.matches(req.path()) {
            metrics::record_static_bypass();
            return GateOutcome::bypass();
        }

        if let Some(redirect) = self.auth_errors.detect(req, &self.resolver) {
            metrics::record_redirect("auth_error");
            let mut response = ResponseDescriptor::redirect(redirect.location);
            self.decorator.decorate(&mut response, req, &redirect.locale.code);
            return GateOutcome {
                action: GateAction::Redirect,
                response,
                locale: Some(redirect.locale),
            };
        }

        let resolved = self.resolver.resolve_with_source(req);
        let (action, mut response) =
            if resolved.source == LocaleSource::Path || self.is_unlocalized(req.path()) {
                (GateAction::Forward, ResponseDescriptor::pass_through())
            } else {
                let location = localized_location(&resolved.code, req);
                tracing::debug!(
                    event = "locale_redirect",
                    locale = %resolved.code,
                    source = resolved.source.as_str(),
                    "Redirecting to localized path"
                );
                metrics::record_redirect("locale");
                (GateAction::Redirect, ResponseDescriptor::redirect(location))
            };

        self.decorator.decorate(&mut response, req, &resolved.code);
        GateOutcome {
            action,
            response,
            locale: Some(resolved),
        }
    }

    fn is_unlocalized(&self, path: &str) -> bool {
        self.unlocalized_prefixes.iter().any(|prefix| {
            path.starts_with(prefix.as_str()) || path == prefix.trim_end_matches('/')
        })
    }
}
