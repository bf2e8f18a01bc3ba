use std::borrow::Cow;
use std::fmt::Write;

use bytes::Bytes;

use crate::config::TruncateLength;
use crate::error::TraceError;

/// Suffix appended when a summary cuts content.
pub const TRUNCATION_MARKER: &str = "...";

/// A body as handed over by the transport.
///
/// Reading may be a one-shot operation for some transports; making the content replayable
/// is the transport's job, so implementations return an error rather than block or consume
/// a live stream.
pub trait BodySource {
    /// The declared content type, if any.
    fn content_type(&self) -> Option<String>;

    /// The declared content length, if known.
    fn content_length(&self) -> Option<u64>;

    /// Reads the whole body.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::SourceRead`] or [`TraceError::Io`] when the content cannot be read.
    fn read(&self) -> Result<Bytes, TraceError>;
}

impl<B: BodySource + ?Sized> BodySource for &B {
    fn content_type(&self) -> Option<String> {
        (**self).content_type()
    }

    fn content_length(&self) -> Option<u64> {
        (**self).content_length()
    }

    fn read(&self) -> Result<Bytes, TraceError> {
        (**self).read()
    }
}

/// Captures a body as text.
///
/// A binary body is never read; its [descriptor](binary_descriptor) is returned instead.
/// A missing source captures as an empty string.
///
/// # Errors
///
/// Propagates the source's read failure.
pub fn capture_body<B>(source: Option<&B>, binary: bool) -> Result<String, TraceError>
where
    B: BodySource + ?Sized,
{
    let Some(source) = source else {
        return Ok(String::new());
    };
    if binary {
        return Ok(binary_descriptor(source));
    }
    let content = source.read()?;
    Ok(content_as_text(&content))
}

/// Describes a possibly-binary body without reading it.
///
/// An unknown content type renders as `null`, an unknown length as `-1`.
pub fn binary_descriptor<B>(source: &B) -> String
where
    B: BodySource + ?Sized,
{
    let content_type = source.content_type();
    let content_type = content_type.as_deref().unwrap_or("null");
    match source.content_length() {
        Some(len) => format!("**possibly-binary(type:{content_type}, len:{len})**"),
        None => format!("**possibly-binary(type:{content_type}, len:-1)**"),
    }
}

/// Decodes content as UTF-8, falling back to lowercase hexadecimal.
pub fn content_as_text(content: &[u8]) -> String {
    match std::str::from_utf8(content) {
        Ok(text) => text.to_string(),
        Err(_) => content.iter().fold(
            String::with_capacity(content.len() * 2),
            |mut acc, byte| {
                let _ = write!(acc, "{byte:02x}");
                acc
            },
        ),
    }
}

/// Bounds a text to `max_len` characters, appending [`TRUNCATION_MARKER`] when content was cut.
///
/// Lengths count Unicode scalar values, so a character is never split.
///
/// # Example
///
/// ```rust
/// use exchange_trace::{TruncateLength, truncate};
///
/// assert_eq!(truncate("abcdef", TruncateLength::new(3)), "abc...");
/// assert_eq!(truncate("abc", TruncateLength::new(3)), "abc");
/// assert_eq!(truncate("abcdef", TruncateLength::UNBOUNDED), "abcdef");
/// ```
pub fn truncate(text: &str, max_len: TruncateLength) -> Cow<'_, str> {
    let Some(limit) = max_len.limit() else {
        return Cow::Borrowed(text);
    };
    match text.char_indices().nth(limit) {
        Some((cut, _)) => {
            let (kept, _) = text.split_at(cut);
            Cow::Owned(format!("{kept}{TRUNCATION_MARKER}"))
        }
        None => Cow::Borrowed(text),
    }
}
