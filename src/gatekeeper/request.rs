//! Request descriptor: the only view of a request the pipeline gets.
//!
//! # Responsibilities
//! - Extract path, query, headers and cookies from an HTTP request
//! - Build descriptors offline (CLI, tests) from a request target string
//!
//! # Design Decisions
//! - Immutable once built; one pipeline pass never mutates it
//! - Header names are case-insensitive (backed by `HeaderMap`)
//! - Duplicate query keys and cookie names: first occurrence wins

use std::collections::{BTreeMap, HashMap};

use axum::http::header::{AsHeaderName, COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Uri};

/// Everything the gatekeeper reads from an inbound request.
#[derive(Debug, Clone, Default)]
pub struct RequestDescriptor {
    path: String,
    raw_query: Option<String>,
    query: BTreeMap<String, String>,
    fragment: Option<String>,
    headers: HeaderMap,
    cookies: HashMap<String, String>,
}

impl RequestDescriptor {
    /// Build from the parts of an HTTP request.
    pub fn from_parts(parts: &Parts) -> Self {
        Self::from_uri_and_headers(&parts.uri, &parts.headers)
    }

    pub fn from_uri_and_headers(uri: &Uri, headers: &HeaderMap) -> Self {
        let mut descriptor = Self::with_target(uri.path(), uri.query(), None);
        descriptor.headers = headers.clone();
        descriptor.cookies = parse_cookie_headers(headers);
        descriptor
    }

    /// Build from a request target such as `/en/page?x=1#top`.
    ///
    /// Any string is accepted; nothing here validates.
    pub fn parse(target: &str) -> Self {
        let (rest, fragment) = match target.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (target, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };
        Self::with_target(path, query, fragment)
    }

    fn with_target(path: &str, query: Option<&str>, fragment: Option<&str>) -> Self {
        Self {
            path: path.to_string(),
            raw_query: query.map(str::to_string),
            query: query.map(parse_query).unwrap_or_default(),
            fragment: fragment.map(str::to_string),
            headers: HeaderMap::new(),
            cookies: HashMap::new(),
        }
    }

    /// Add a header. Names or values no HTTP server could deliver are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            if name == COOKIE {
                for (k, v) in parse_cookie_pairs(value.to_str().unwrap_or_default()) {
                    self.cookies.entry(k).or_insert(v);
                }
            }
            self.headers.append(name, value);
        }
        self
    }

    /// Add a cookie with an arbitrary value.
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies
            .entry(name.to_string())
            .or_insert_with(|| value.to_string());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The query string exactly as received, without the `?`.
    pub fn raw_query(&self) -> Option<&str> {
        self.raw_query.as_deref()
    }

    /// Decoded value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// First value of a header, if it is visible ASCII.
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// The first non-empty path segment, undecoded.
    pub fn first_segment(&self) -> Option<&str> {
        self.segments().next()
    }

    /// Non-empty path segments, undecoded.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }
}

fn parse_query(raw: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    params
}

fn parse_cookie_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for value in headers.get_all(COOKIE) {
        let Ok(value) = value.to_str() else {
            continue;
        };
        for (name, v) in parse_cookie_pairs(value) {
            cookies.entry(name).or_insert(v);
        }
    }
    cookies
}

fn parse_cookie_pairs(header: &str) -> impl Iterator<Item = (String, String)> + '_ {
    header.split(';').filter_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some((name.to_string(), value.trim().to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_parse_target() {
        let req = RequestDescriptor::parse("/en/page?x=1&y=a%20b#top");
        assert_eq!(req.path(), "/en/page");
        assert_eq!(req.raw_query(), Some("x=1&y=a%20b"));
        assert_eq!(req.query_param("y"), Some("a b"));
        assert_eq!(req.fragment(), Some("top"));
        assert_eq!(req.first_segment(), Some("en"));
    }

    #[test]
    fn test_first_query_key_wins() {
        let req = RequestDescriptor::parse("/?error=first&error=second");
        assert_eq!(req.query_param("error"), Some("first"));
    }

    #[test]
    fn test_from_parts() {
        let (parts, _) = Request::builder()
            .uri("http://example.com/es/x?error=Denied")
            .header("Cookie", "theme=dark; locale=es")
            .header("cookie", "locale=fr")
            .header("ACCEPT-LANGUAGE", "es-ES")
            .body(())
            .unwrap()
            .into_parts();
        let req = RequestDescriptor::from_parts(&parts);

        assert_eq!(req.path(), "/es/x");
        assert_eq!(req.query_param("error"), Some("Denied"));
        assert_eq!(req.cookie("locale"), Some("es"));
        assert_eq!(req.cookie("theme"), Some("dark"));
        assert_eq!(req.header("accept-language"), Some("es-ES"));
        assert_eq!(req.fragment(), None);
    }

    #[test]
    fn test_cookie_header_via_builder() {
        let req = RequestDescriptor::parse("/").with_header("Cookie", "locale=es;  a = b ;junk");
        assert_eq!(req.cookie("locale"), Some("es"));
        assert_eq!(req.cookie("a"), Some("b"));
        assert_eq!(req.cookie("junk"), None);
    }

    #[test]
    fn test_undeliverable_header_ignored() {
        let req = RequestDescriptor::parse("/").with_header("bad name", "x").with_header("x-ok", "a\nb");
        assert_eq!(req.header("x-ok"), None);
    }

    #[test]
    fn test_empty_and_root_paths() {
        assert_eq!(RequestDescriptor::parse("").first_segment(), None);
        assert_eq!(RequestDescriptor::parse("/").first_segment(), None);
        assert_eq!(RequestDescriptor::parse("//en").first_segment(), Some("en"));
    }
}
