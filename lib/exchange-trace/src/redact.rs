use std::borrow::Cow;

use http::header::{AUTHORIZATION, CONTENT_DISPOSITION};

/// Prefix shown in place of a masked credential.
pub const MASKED_PREFIX: &str = "Bearer ****";

/// Number of trailing characters of a credential left visible.
pub const VISIBLE_SUFFIX_CHARS: usize = 4;

/// A header value that is safe to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactedHeader<'a> {
    /// The display form of the value.
    pub value: Cow<'a, str>,
    /// Set when the header marks the body as possibly binary.
    pub binary_marker: bool,
}

/// Returns a display-safe form of a header value.
///
/// - `Authorization` with a non-empty value becomes `"Bearer ****"` followed by the last four
///   characters of the value (or all of it when shorter).
/// - `Content-Disposition` passes through unchanged but raises the binary marker.
/// - Anything else passes through unchanged.
///
/// Names match ASCII case-insensitively, since `http` normalizes header names to lowercase.
///
/// # Example
///
/// ```rust
/// use exchange_trace::redact_header;
///
/// let redacted = redact_header("Authorization", "Bearer abcd1234wxyz");
/// assert_eq!(redacted.value, "Bearer ****wxyz");
/// assert!(!redacted.binary_marker);
///
/// let redacted = redact_header("content-disposition", "attachment; filename=\"a.pdf\"");
/// assert!(redacted.binary_marker);
/// ```
pub fn redact_header<'a>(name: &str, value: &'a str) -> RedactedHeader<'a> {
    if name.eq_ignore_ascii_case(AUTHORIZATION.as_str()) && !value.is_empty() {
        RedactedHeader {
            value: Cow::Owned(mask_credential(value)),
            binary_marker: false,
        }
    } else {
        RedactedHeader {
            value: Cow::Borrowed(value),
            binary_marker: name.eq_ignore_ascii_case(CONTENT_DISPOSITION.as_str()),
        }
    }
}

fn mask_credential(value: &str) -> String {
    let start = value
        .char_indices()
        .rev()
        .nth(VISIBLE_SUFFIX_CHARS - 1)
        .map_or(0, |(index, _)| index);
    let suffix = value.get(start..).unwrap_or(value);
    format!("{MASKED_PREFIX}{suffix}")
}
