//! Authentication error redirects.
//!
//! The upstream auth provider reports failures by sending the browser back to
//! an auth page with `?error=<Token>`. Those requests go straight to the
//! localized error page. The token is opaque: it is only ever carried
//! URL-encoded inside a query value.

use crate::gatekeeper::request::RequestDescriptor;
use crate::locale::{is_locale_shaped, LocaleResolver, ResolvedLocale};

/// Auth pages matched exactly or with further segments.
const AUTH_PAGES: [&str; 2] = ["/auth/signin", "/auth/callback"];
/// Auth API routes matched by prefix.
const AUTH_API_PREFIX: &str = "/api/auth/";
/// Query parameter set by the auth provider.
pub const ERROR_PARAM: &str = "error";

/// Where an auth error request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthErrorRedirect {
    pub location: String,
    pub locale: ResolvedLocale,
}

#[derive(Debug, Clone)]
pub struct AuthErrorDetector {
    error_page: String,
}

impl AuthErrorDetector {
    /// `error_page` is the unlocalized page path, e.g. `/auth/error`.
    pub fn new(error_page: impl Into<String>) -> Self {
        Self {
            error_page: error_page.into(),
        }
    }

    pub fn detect(
        &self,
        req: &RequestDescriptor,
        resolver: &LocaleResolver,
    ) -> Option<AuthErrorRedirect> {
        if !is_auth_path(req.path()) {
            return None;
        }
        let error = req.query_param(ERROR_PARAM).filter(|e| !e.is_empty())?;

        let locale = resolver.resolve_with_source(req);
        let location = format!(
            "/{}{}?{}={}",
            locale.code,
            self.error_page,
            ERROR_PARAM,
            encode_token(error)
        );

        tracing::info!(
            event = "auth_error_redirect",
            error = %error.escape_debug(),
            locale = %locale.code,
            path = %req.path().escape_debug(),
            "Redirecting auth error to error page"
        );

        Some(AuthErrorRedirect { location, locale })
    }
}

/// Percent-encode an opaque token. Dots are encoded too so a token can never
/// put `..` into a Location value.
fn encode_token(token: &str) -> String {
    urlencoding::encode(token).replace('.', "%2E")
}

/// True for the auth pages and auth API routes, with or without a leading
/// locale segment.
pub fn is_auth_path(path: &str) -> bool {
    let rest = strip_locale_segment(path);
    AUTH_PAGES.iter().any(|page| {
        rest.strip_prefix(page)
            .is_some_and(|tail| tail.is_empty() || tail.starts_with('/'))
    }) || rest.starts_with(AUTH_API_PREFIX)
}

fn strip_locale_segment(path: &str) -> &str {
    let Some(after_slash) = path.strip_prefix('/') else {
        return path;
    };
    match after_slash.split_once('/') {
        Some((first, _)) if is_locale_shaped(first) => &after_slash[first.len()..],
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::{LocaleRegistry, LocaleSource};
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    fn resolver() -> LocaleResolver {
        let registry = LocaleRegistry::new(["en", "es"], "en").unwrap();
        LocaleResolver::new(Arc::new(registry), "locale")
    }

    fn detect(target: &str) -> Option<AuthErrorRedirect> {
        AuthErrorDetector::new("/auth/error").detect(&RequestDescriptor::parse(target), &resolver())
    }

    #[test]
    fn test_auth_paths() {
        assert!(is_auth_path("/auth/signin"));
        assert!(is_auth_path("/en/auth/signin"));
        assert!(is_auth_path("/auth/callback/github"));
        assert!(is_auth_path("/es/auth/callback"));
        assert!(is_auth_path("/api/auth/callback/credentials"));
        assert!(!is_auth_path("/auth/signinx"));
        assert!(!is_auth_path("/auth/error"));
        assert!(!is_auth_path("/dashboard/auth/signin"));
        assert!(!is_auth_path("/api/users"));
        assert!(!is_auth_path("/api/auth"));
    }

    #[test]
    fn test_redirects_to_localized_error_page() {
        let redirect = detect("/en/auth/signin?error=OAuthAccountNotLinked").unwrap();
        assert_eq!(redirect.location, "/en/auth/error?error=OAuthAccountNotLinked");
        assert_eq!(redirect.locale.code, "en");
        assert_eq!(redirect.locale.source, LocaleSource::Path);
    }

    #[test]
    fn test_locale_comes_from_resolver() {
        let req = RequestDescriptor::parse("/api/auth/callback/google?error=AccessDenied")
            .with_cookie("locale", "es");
        let redirect = AuthErrorDetector::new("/auth/error").detect(&req, &resolver()).unwrap();
        assert_eq!(redirect.location, "/es/auth/error?error=AccessDenied");
    }

    #[test]
    fn test_error_value_is_encoded() {
        let redirect = detect("/auth/signin?error=%3Cscript%3Ealert(1)%3C%2Fscript%3E").unwrap();
        assert!(!redirect.location.contains('<'));
        assert!(redirect.location.ends_with("?error=%3Cscript%3Ealert%281%29%3C%2Fscript%3E"));

        let redirect = detect("/auth/signin?error=..%2F..%2Fetc").unwrap();
        assert!(!redirect.location.contains(".."));
        assert!(redirect.location.ends_with("?error=%2E%2E%2F%2E%2E%2Fetc"));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn detect_logged(target: &str) -> serde_json::Value {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            detect(target).unwrap();
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let line = output
            .lines()
            .find(|line| line.contains("auth_error_redirect"))
            .unwrap();
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn test_redirect_is_logged_with_plain_fields() {
        let entry = detect_logged("/en/auth/signin?error=OAuthAccountNotLinked");
        let fields = &entry["fields"];
        assert_eq!(entry["level"], "INFO");
        assert_eq!(fields["event"], "auth_error_redirect");
        assert_eq!(fields["error"], "OAuthAccountNotLinked");
        assert_eq!(fields["locale"], "en");
        assert_eq!(fields["path"], "/en/auth/signin");
    }

    #[test]
    fn test_logged_error_token_is_escaped() {
        let entry = detect_logged("/auth/signin?error=bad%0Aline");
        let error = entry["fields"]["error"].as_str().unwrap();
        assert_eq!(error, "bad\\nline");
        assert!(!error.contains('\n'));
    }

    #[test]
    fn test_no_false_positives() {
        assert!(detect("/en/dashboard?error=oops").is_none());
        assert!(detect("/auth/signin").is_none());
        assert!(detect("/auth/signin?error=").is_none());
        assert!(detect("/auth/signin?other=1").is_none());
    }
}
