//! Security headers and the locale cookie.
//!
//! # Responsibilities
//! - Add the fixed security header set to every pipeline response
//! - Add `X-Locale` with the resolved locale
//! - Set the locale cookie when the request does not already carry it
//!
//! # Design Decisions
//! - The header set is not configurable
//! - Only registry-minted `LocaleCode`s reach the cookie value
//! - `Secure` is added in production only, so plain-HTTP development works

use axum::http::header::{SET_COOKIE, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION};
use axum::http::HeaderName;

use crate::config::GatekeeperConfig;
use crate::gatekeeper::request::RequestDescriptor;
use crate::gatekeeper::response::ResponseDescriptor;
use crate::locale::LocaleCode;

/// Response header carrying the resolved locale.
pub const X_LOCALE: HeaderName = HeaderName::from_static("x-locale");

/// Fixed security headers added to every decorated response.
pub const SECURITY_HEADERS: [(HeaderName, &str); 3] = [
    (X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (X_FRAME_OPTIONS, "DENY"),
    (X_XSS_PROTECTION, "1; mode=block"),
];

#[derive(Debug, Clone)]
pub struct ResponseDecorator {
    cookie_name: String,
    cookie_path: String,
    max_age_secs: u64,
    secure: bool,
}

impl ResponseDecorator {
    pub fn new(cookie_name: impl Into<String>, cookie_path: impl Into<String>, max_age_secs: u64, secure: bool) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            cookie_path: cookie_path.into(),
            max_age_secs,
            secure,
        }
    }

    pub fn from_config(config: &GatekeeperConfig) -> Self {
        Self::new(
            config.cookie.name.clone(),
            config.cookie.path.clone(),
            config.cookie.max_age_secs,
            config.environment.is_production(),
        )
    }

    /// Add security headers, `X-Locale` and, if needed, the locale cookie.
    pub fn decorate(&self, response: &mut ResponseDescriptor, req: &RequestDescriptor, locale: &LocaleCode) {
        for (name, value) in SECURITY_HEADERS {
            response.insert_header(name, value);
        }
        response.insert_header(X_LOCALE, locale.as_str());

        if req.cookie(&self.cookie_name) != Some(locale.as_str()) {
            response.append_header(SET_COOKIE, &self.locale_cookie(locale));
        }
    }

    /// The `Set-Cookie` value for `locale`.
    pub fn locale_cookie(&self, locale: &LocaleCode) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; SameSite=Lax; Path={}; Max-Age={}",
            self.cookie_name, locale, self.cookie_path, self.max_age_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}
