//! Hostile input screening.
//!
//! # Responsibilities
//! - Screen locale candidates before they are matched against the registry
//! - Screen any untrusted text before it reaches a Location or Set-Cookie value
//!
//! # Design Decisions
//! - Percent-decode exactly once; a second layer of encoding stays encoded
//!   and is therefore inert in a header
//! - Rejection is a value, never an error: callers fall through silently
//! - The rejected payload is never returned, only the reason

use std::borrow::Cow;

/// Longest accepted locale candidate, in characters (after decoding).
pub const MAX_LOCALE_CANDIDATE_CHARS: usize = 10;

/// Raw bytes one decoded char can take: four UTF-8 bytes, each as `%XX`.
const MAX_ENCODED_BYTES_PER_CHAR: usize = 12;

/// Why a candidate was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Longer than any locale code could be.
    Oversized,
    /// Percent-decoding produced invalid UTF-8.
    InvalidEncoding,
    /// Contains `..`.
    Traversal,
    /// Contains `<` or `>`.
    Markup,
    /// Contains `"` or `'`.
    Quote,
    /// Contains a NUL byte.
    NullByte,
    /// Contains another control character (CR, LF, TAB, ...).
    ControlChar,
}

impl RejectReason {
    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::Oversized => "oversized",
            RejectReason::InvalidEncoding => "invalid_encoding",
            RejectReason::Traversal => "traversal",
            RejectReason::Markup => "markup",
            RejectReason::Quote => "quote",
            RejectReason::NullByte => "null_byte",
            RejectReason::ControlChar => "control_char",
        }
    }
}

/// Outcome of screening one untrusted string.
///
/// Matching on the variant is the only way to get at the cleaned value, so a
/// caller cannot forget the rejected case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizationVerdict {
    Accepted { cleaned: String },
    Rejected(RejectReason),
}

impl SanitizationVerdict {
    /// The accepted value, if any.
    pub fn cleaned(&self) -> Option<&str> {
        match self {
            SanitizationVerdict::Accepted { cleaned } => Some(cleaned),
            SanitizationVerdict::Rejected(_) => None,
        }
    }

    /// Accepted values are passed through untouched; there is no repair step.
    pub fn was_modified(&self) -> bool {
        false
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, SanitizationVerdict::Rejected(_))
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            SanitizationVerdict::Rejected(reason) => Some(*reason),
            SanitizationVerdict::Accepted { .. } => None,
        }
    }
}

/// Screen a raw locale candidate (path segment, cookie value, language tag).
pub fn sanitize_locale_candidate(raw: &str) -> SanitizationVerdict {
    // A decoded char is at most four UTF-8 bytes, each `%XX` encoded
    if raw.len() > MAX_LOCALE_CANDIDATE_CHARS * MAX_ENCODED_BYTES_PER_CHAR {
        return SanitizationVerdict::Rejected(RejectReason::Oversized);
    }

    let decoded = match decode_once(raw) {
        Some(decoded) => decoded,
        None => return SanitizationVerdict::Rejected(RejectReason::InvalidEncoding),
    };

    if let Some(reason) = find_hostile(raw).or_else(|| find_hostile(&decoded)) {
        return SanitizationVerdict::Rejected(reason);
    }

    if decoded.chars().count() > MAX_LOCALE_CANDIDATE_CHARS {
        return SanitizationVerdict::Rejected(RejectReason::Oversized);
    }

    SanitizationVerdict::Accepted {
        cleaned: raw.to_string(),
    }
}

/// First hostile marker found in `s`, checked without decoding.
pub fn find_hostile(s: &str) -> Option<RejectReason> {
    if s.contains('\0') {
        return Some(RejectReason::NullByte);
    }
    if s.contains("..") {
        return Some(RejectReason::Traversal);
    }
    if s.contains(['<', '>']) {
        return Some(RejectReason::Markup);
    }
    if s.contains(['"', '\'']) {
        return Some(RejectReason::Quote);
    }
    if s.chars().any(char::is_control) {
        return Some(RejectReason::ControlChar);
    }
    None
}

/// True when neither `s` nor its single percent-decoding carries a hostile
/// marker. Used for text copied verbatim into a Location value.
pub fn is_header_safe(s: &str) -> bool {
    if find_hostile(s).is_some() {
        return false;
    }
    match decode_once(s) {
        Some(decoded) => find_hostile(&decoded).is_none(),
        None => false,
    }
}

/// Percent-decode one layer. `None` when the result is not UTF-8.
pub fn decode_once(raw: &str) -> Option<Cow<'_, str>> {
    urlencoding::decode(raw).ok()
}
