use std::borrow::Cow;
use std::io::Read;

use bytes::Bytes;
use http::{Method, StatusCode};
use indexmap::IndexMap;
use url::Url;

use super::{HeaderPairs, RequestSource, ResponseSource};
use crate::body::BodySource;
use crate::error::TraceError;

/// A pre-buffered entity: content plus its declared type and length.
///
/// The content is buffered once, so it can be read for tracing and still be sent or consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySnapshot {
    content_type: Option<String>,
    content_length: Option<u64>,
    content: Bytes,
}

impl EntitySnapshot {
    /// Wraps buffered content; the declared length is the content length.
    pub fn new(content: impl Into<Bytes>) -> Self {
        let content = content.into();
        Self {
            content_type: None,
            content_length: Some(content.len() as u64),
            content,
        }
    }

    /// Buffers a reader to its end.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Io`] when the reader fails.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, TraceError> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        Ok(Self::new(content))
    }

    /// Sets the declared content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Overrides the declared content length (`None` when unknown).
    #[must_use]
    pub fn with_content_length(mut self, content_length: Option<u64>) -> Self {
        self.content_length = content_length;
        self
    }

    /// The buffered content.
    pub fn content(&self) -> &Bytes {
        &self.content
    }
}

impl BodySource for EntitySnapshot {
    fn content_type(&self) -> Option<String> {
        self.content_type.clone()
    }

    fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    fn read(&self) -> Result<Bytes, TraceError> {
        Ok(self.content.clone())
    }
}

/// A request as seen by the legacy blocking transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    url: Url,
    headers: Vec<(String, String)>,
    entity: Option<EntitySnapshot>,
}

impl HttpRequest {
    /// Creates a request without headers or entity.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            entity: None,
        }
    }

    /// Appends a header; duplicates are kept in order.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attaches the buffered entity.
    #[must_use]
    pub fn with_entity(mut self, entity: EntitySnapshot) -> Self {
        self.entity = Some(entity);
        self
    }
}

impl RequestSource for HttpRequest {
    type Body<'a> = &'a EntitySnapshot;

    fn method(&self) -> &str {
        self.method.as_str()
    }

    fn url(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.url.as_str())
    }

    fn headers(&self) -> Option<HeaderPairs<'_>> {
        let pairs = self
            .headers
            .iter()
            .map(|(name, value)| (name.as_str(), Cow::Borrowed(value.as_str())))
            .collect();
        Some(pairs)
    }

    fn body(&self) -> Option<Self::Body<'_>> {
        self.entity.as_ref()
    }
}

/// A response as seen by the legacy blocking transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status_code: StatusCode,
    status_text: String,
    headers: IndexMap<String, String>,
    entity: Option<EntitySnapshot>,
}

impl HttpResponse {
    /// Creates a response; the status text defaults to the code and its reason, e.g. `"200 OK"`.
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            status_code,
            status_text: status_code.to_string(),
            headers: IndexMap::new(),
            entity: None,
        }
    }

    /// Overrides the status text, e.g. with the raw status line.
    #[must_use]
    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    /// Sets a header, replacing any previous value.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attaches the buffered entity.
    #[must_use]
    pub fn with_entity(mut self, entity: EntitySnapshot) -> Self {
        self.entity = Some(entity);
        self
    }

    /// The status code.
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }
}

impl ResponseSource for HttpResponse {
    type Body<'a> = &'a EntitySnapshot;

    fn status(&self) -> String {
        self.status_text.clone()
    }

    fn headers(&self) -> Option<HeaderPairs<'_>> {
        let pairs = self
            .headers
            .iter()
            .map(|(name, value)| (name.as_str(), Cow::Borrowed(value.as_str())))
            .collect();
        Some(pairs)
    }

    fn body(&self) -> Option<Self::Body<'_>> {
        self.entity.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"))
        }
    }

    #[test]
    fn test_entity_from_reader_buffers_content() {
        let entity = EntitySnapshot::from_reader(&b"payload"[..]).expect("should buffer");

        assert_eq!(entity.content().as_ref(), b"payload");
        assert_eq!(entity.content_length(), Some(7));
    }

    #[test]
    fn test_entity_from_failing_reader() {
        let error = EntitySnapshot::from_reader(FailingReader).expect_err("should fail");

        assert!(matches!(error, TraceError::Io(_)));
    }

    #[test]
    fn test_entity_can_be_read_twice() {
        let entity = EntitySnapshot::new("twice");

        let first = entity.read().expect("first read");
        let second = entity.read().expect("second read");

        assert_eq!(first, second);
    }

    #[test]
    fn test_request_command() -> Result<(), url::ParseError> {
        let request = HttpRequest::new(
            Method::DELETE,
            Url::parse("https://api.example.com/sheets/42")?,
        );

        assert_eq!(request.command(), "DELETE https://api.example.com/sheets/42");
        Ok(())
    }

    #[test]
    fn test_request_headers_keep_order() -> Result<(), url::ParseError> {
        let request = HttpRequest::new(Method::GET, Url::parse("https://api.example.com/")?)
            .with_header("X-B", "2")
            .with_header("X-A", "1");

        let names: Vec<_> = request
            .headers()
            .unwrap_or_default()
            .into_iter()
            .map(|(name, _)| name)
            .collect();

        assert_eq!(names, vec!["X-B", "X-A"]);
        Ok(())
    }

    #[test]
    fn test_response_status_text() {
        let response = HttpResponse::new(StatusCode::NOT_FOUND);

        assert_eq!(response.status(), "404 Not Found");

        let response = response.with_status_text("HTTP/1.1 404 Not Found");
        assert_eq!(response.status(), "HTTP/1.1 404 Not Found");
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }
}
