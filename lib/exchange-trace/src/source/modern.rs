use std::borrow::Cow;

use bytes::Bytes;
use headers::{ContentLength, HeaderMapExt};
use http::HeaderMap;
use http::header::CONTENT_TYPE;
use tracing::debug;

use super::{HeaderPairs, RequestSource, ResponseSource};
use crate::body::BodySource;
use crate::error::{Side, TraceError};

fn header_pairs(headers: &HeaderMap) -> HeaderPairs<'_> {
    headers
        .iter()
        .map(|(name, value)| (name.as_str(), String::from_utf8_lossy(value.as_bytes())))
        .collect()
}

/// The `Content-Type` value exactly as declared, not normalized as a MIME type.
fn declared_content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

fn declared_content_length(headers: &HeaderMap) -> Option<u64> {
    headers.typed_get::<ContentLength>().map(|it| it.0)
}

/// The body of a `reqwest::Request`.
///
/// Only buffered bodies can be read; a streaming body is consumed by the transport when sent.
/// Without a `Content-Length` header the length of a streaming body is unknown.
#[derive(Debug, Clone, Copy)]
pub struct ReqwestBody<'a> {
    headers: &'a HeaderMap,
    body: &'a reqwest::Body,
}

impl BodySource for ReqwestBody<'_> {
    fn content_type(&self) -> Option<String> {
        declared_content_type(self.headers)
    }

    fn content_length(&self) -> Option<u64> {
        declared_content_length(self.headers)
            .or_else(|| self.body.as_bytes().map(|content| content.len() as u64))
    }

    fn read(&self) -> Result<Bytes, TraceError> {
        self.body
            .as_bytes()
            .map(Bytes::copy_from_slice)
            .ok_or_else(|| TraceError::SourceRead {
                side: Side::Request,
                message: "streaming body cannot be replayed".to_string(),
            })
    }
}

impl RequestSource for reqwest::Request {
    type Body<'a> = ReqwestBody<'a>;

    fn method(&self) -> &str {
        reqwest::Request::method(self).as_str()
    }

    fn url(&self) -> Cow<'_, str> {
        Cow::Borrowed(reqwest::Request::url(self).as_str())
    }

    fn headers(&self) -> Option<HeaderPairs<'_>> {
        Some(header_pairs(reqwest::Request::headers(self)))
    }

    fn body(&self) -> Option<Self::Body<'_>> {
        reqwest::Request::body(self).map(|body| ReqwestBody {
            headers: reqwest::Request::headers(self),
            body,
        })
    }
}

/// An in-memory body of an `http::Request` or `http::Response`.
#[derive(Debug, Clone, Copy)]
pub struct BufferedBody<'a> {
    headers: &'a HeaderMap,
    content: &'a [u8],
}

impl BodySource for BufferedBody<'_> {
    fn content_type(&self) -> Option<String> {
        declared_content_type(self.headers)
    }

    fn content_length(&self) -> Option<u64> {
        declared_content_length(self.headers).or(Some(self.content.len() as u64))
    }

    fn read(&self) -> Result<Bytes, TraceError> {
        Ok(Bytes::copy_from_slice(self.content))
    }
}

impl<B: AsRef<[u8]>> RequestSource for http::Request<B> {
    type Body<'a>
        = BufferedBody<'a>
    where
        Self: 'a;

    fn method(&self) -> &str {
        http::Request::method(self).as_str()
    }

    fn url(&self) -> Cow<'_, str> {
        Cow::Owned(self.uri().to_string())
    }

    fn headers(&self) -> Option<HeaderPairs<'_>> {
        Some(header_pairs(http::Request::headers(self)))
    }

    fn body(&self) -> Option<Self::Body<'_>> {
        Some(BufferedBody {
            headers: http::Request::headers(self),
            content: http::Request::body(self).as_ref(),
        })
    }
}

impl<B: AsRef<[u8]>> ResponseSource for http::Response<B> {
    type Body<'a>
        = BufferedBody<'a>
    where
        Self: 'a;

    fn status(&self) -> String {
        http::Response::status(self).as_u16().to_string()
    }

    fn headers(&self) -> Option<HeaderPairs<'_>> {
        Some(header_pairs(http::Response::headers(self)))
    }

    fn body(&self) -> Option<Self::Body<'_>> {
        Some(BufferedBody {
            headers: http::Response::headers(self),
            content: http::Response::body(self).as_ref(),
        })
    }
}

/// Buffers a live `reqwest` response so it can be traced and still consumed.
///
/// The returned response keeps status, version and headers. Convert it back with
/// `reqwest::Response::from` when the caller expects a `reqwest::Response`.
///
/// # Errors
///
/// Returns [`TraceError::Reqwest`] when the body cannot be read.
///
/// # Example
///
/// ```rust,no_run
/// use exchange_trace::{ExchangeSnapshot, TraceLevel, TraceLevels, buffer_response};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = reqwest::Client::new();
/// let request = client.get("https://api.example.com/sheets").build()?;
/// let traced_request = request.try_clone();
///
/// let response = buffer_response(client.execute(request).await?).await?;
/// let levels = TraceLevels::new().with(TraceLevel::Verbose);
/// let snapshot = ExchangeSnapshot::from_reqwest(traced_request.as_ref(), Some(&response), &levels)?;
/// println!("{snapshot:#}");
///
/// let response = reqwest::Response::from(response);
/// # Ok(())
/// # }
/// ```
pub async fn buffer_response(
    response: reqwest::Response,
) -> Result<http::Response<Bytes>, TraceError> {
    let status = response.status();
    let version = response.version();
    let headers = response.headers().clone();
    let content = response.bytes().await?;
    debug!(%status, len = content.len(), "buffered response");

    let mut result = http::Response::new(content);
    *result.status_mut() = status;
    *result.version_mut() = version;
    *result.headers_mut() = headers;
    Ok(result)
}
