//! Building Location values from untrusted request parts.
//!
//! # Design Decisions
//! - The path is rebuilt segment by segment; nothing is copied wholesale
//! - Each segment is decoded once for inspection and re-encoded on output
//! - Query and fragment are kept verbatim when already clean, otherwise the
//!   query is rebuilt from its clean pairs and the fragment is dropped

use url::form_urlencoded;

use crate::gatekeeper::request::RequestDescriptor;
use crate::locale::{is_locale_shaped, LocaleCode};
use crate::security::sanitizer::{decode_once, find_hostile, is_header_safe};

/// Location for `req` moved under `locale`.
///
/// A locale-shaped first segment is replaced rather than nested, so
/// `/xx/dashboard` becomes `/en/dashboard`.
pub fn localized_location(locale: &LocaleCode, req: &RequestDescriptor) -> String {
    let mut location = format!("/{}", locale);

    let mut segments = req.segments().peekable();
    if segments.peek().is_some_and(|first| is_locale_shaped(first)) {
        segments.next();
    }
    for segment in segments.filter_map(clean_segment) {
        location.push('/');
        location.push_str(&segment);
    }

    append_query_and_fragment(&mut location, req);
    location
}

fn clean_segment(raw: &str) -> Option<String> {
    if raw == "." || find_hostile(raw).is_some() {
        return None;
    }
    let decoded = decode_once(raw)?;
    if decoded.is_empty() || decoded == "." || find_hostile(&decoded).is_some() {
        return None;
    }
    Some(urlencoding::encode(&decoded).into_owned())
}

fn append_query_and_fragment(location: &mut String, req: &RequestDescriptor) {
    if let Some(query) = req.raw_query().and_then(clean_query) {
        location.push('?');
        location.push_str(&query);
    }
    if let Some(fragment) = req.fragment().filter(|f| is_verbatim_safe(f)) {
        location.push('#');
        location.push_str(fragment);
    }
}

/// The query to carry into a Location, or `None` when nothing survives.
pub fn clean_query(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    if is_verbatim_safe(raw) {
        return Some(raw.to_string());
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut kept = 0usize;
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        if find_hostile(&key).is_none() && find_hostile(&value).is_none() {
            serializer.append_pair(&key, &value);
            kept += 1;
        }
    }
    if kept == 0 {
        None
    } else {
        Some(serializer.finish())
    }
}

fn is_verbatim_safe(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_graphic()) && is_header_safe(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LocaleRegistry;

    fn en() -> LocaleCode {
        LocaleRegistry::new(["en", "es"], "en").unwrap().default_locale()
    }

    fn location(target: &str) -> String {
        localized_location(&en(), &RequestDescriptor::parse(target))
    }

    #[test]
    fn test_root_and_plain_paths() {
        assert_eq!(location("/"), "/en");
        assert_eq!(location(""), "/en");
        assert_eq!(location("/dashboard/settings"), "/en/dashboard/settings");
    }

    #[test]
    fn test_unsupported_locale_segment_replaced() {
        assert_eq!(location("/xx/dashboard"), "/en/dashboard");
        assert_eq!(location("/pt-BR"), "/en");
        assert_eq!(location("/faq"), "/en/faq");
    }

    #[test]
    fn test_traversal_removed() {
        let loc = location("/../../../etc/passwd");
        assert_eq!(loc, "/en/etc/passwd");
        assert!(!loc.contains(".."));

        let loc = location("/%2e%2e/%2E%2E%2Fsecret/./x");
        assert_eq!(loc, "/en/x");
    }

    #[test]
    fn test_markup_segments_removed() {
        let loc = location("/<script>alert(1)</script>/home");
        assert!(!loc.contains("<script>"));
        assert_eq!(loc, "/en/home");

        assert_eq!(location("/%3Cscript%3E/home"), "/en/home");
    }

    #[test]
    fn test_segments_are_reencoded() {
        assert_eq!(location("/docs/a%20b"), "/en/docs/a%20b");
        assert_eq!(location("/docs/caf\u{e9}"), "/en/docs/caf%C3%A9");
    }

    #[test]
    fn test_query_and_fragment_preserved() {
        assert_eq!(location("/search?q=rust&page=2#results"), "/en/search?q=rust&page=2#results");
    }

    #[test]
    fn test_hostile_query_pairs_dropped() {
        assert_eq!(location("/p?next=../admin&ok=1"), "/en/p?ok=1");
        assert_eq!(location("/p?x=%3Cscript%3E"), "/en/p");
        assert_eq!(location("/p#<img>"), "/en/p");
    }

    #[test]
    fn test_clean_query() {
        assert_eq!(clean_query(""), None);
        assert_eq!(clean_query("a=1").as_deref(), Some("a=1"));
        assert_eq!(clean_query("a=%00&b=two words").as_deref(), Some("b=two+words"));
    }
}
