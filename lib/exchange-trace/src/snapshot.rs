use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::body::{BodySource, capture_body, truncate};
use crate::config::{TruncateLength, default_truncate_len};
use crate::error::{Side, TraceError};
use crate::level::{BodyMode, TraceLevels};
use crate::payload::{
    PayloadBuilder, PayloadData, RequestData, RequestDataBuilder, ResponseData,
    ResponseDataBuilder,
};
use crate::redact::redact_header;
use crate::source::{HeaderPairs, HttpRequest, HttpResponse, RequestSource, ResponseSource};

/// An immutable capture of one request/response exchange.
///
/// Either side is absent when it was not available, e.g. the exchange failed before a
/// response existed. Render it with [`Display`](std::fmt::Display) (`{}` compact, `{:#}` pretty)
/// or [`render`](Self::render).
///
/// # Example
///
/// ```rust
/// use exchange_trace::{ExchangeSnapshot, TraceLevel, TraceLevels};
///
/// let request = http::Request::builder()
///     .uri("https://api.example.com/sheets")
///     .header("Authorization", "Bearer abcd1234wxyz")
///     .body("{}")?;
/// let levels = TraceLevels::new()
///     .with(TraceLevel::RequestHeaders)
///     .with(TraceLevel::RequestBody);
///
/// let snapshot = ExchangeSnapshot::from_http(Some(&request), None::<&http::Response<String>>, &levels)?;
///
/// assert_eq!(
///     snapshot.to_string(),
///     "{request:{command:'GET https://api.example.com/sheets',headers:{'authorization':'Bearer ****wxyz',},body:'{}'},response:null}"
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExchangeSnapshot {
    request: Option<RequestData>,
    response: Option<ResponseData>,
}

impl ExchangeSnapshot {
    /// Assembles a snapshot from any transport shape.
    ///
    /// For each present side the identifier is always recorded; headers, body and body summary
    /// are captured according to `levels`. Headers are fully processed before the body, since a
    /// `Content-Disposition` header switches the body to its binary descriptor.
    ///
    /// # Errors
    ///
    /// Fails when a body source cannot be read; no partial snapshot is returned.
    pub fn capture<Req, Res>(
        request: Option<&Req>,
        response: Option<&Res>,
        levels: &TraceLevels,
        truncate_len: TruncateLength,
    ) -> Result<Self, TraceError>
    where
        Req: RequestSource + ?Sized,
        Res: ResponseSource + ?Sized,
    {
        let request = request
            .map(|request| capture_request(request, levels, truncate_len))
            .transpose()?;
        let response = response
            .map(|response| capture_response(response, levels, truncate_len))
            .transpose()?;
        Ok(Self { request, response })
    }

    /// Assembles a snapshot from the legacy message model, with the process-wide summary length.
    ///
    /// # Errors
    ///
    /// Fails when a body source cannot be read.
    pub fn from_legacy(
        request: Option<&HttpRequest>,
        response: Option<&HttpResponse>,
        levels: &TraceLevels,
    ) -> Result<Self, TraceError> {
        Self::capture(request, response, levels, default_truncate_len())
    }

    /// Assembles a snapshot from a `reqwest` request and a [buffered](crate::buffer_response)
    /// response, with the process-wide summary length.
    ///
    /// # Errors
    ///
    /// Fails when the request has a streaming body and a body level is enabled.
    pub fn from_reqwest(
        request: Option<&reqwest::Request>,
        response: Option<&http::Response<Bytes>>,
        levels: &TraceLevels,
    ) -> Result<Self, TraceError> {
        Self::capture(request, response, levels, default_truncate_len())
    }

    /// Assembles a snapshot from in-memory `http` types, with the process-wide summary length.
    ///
    /// # Errors
    ///
    /// Never fails for in-memory bodies; the `Result` keeps the signature aligned with the
    /// other constructors.
    pub fn from_http<ReqB, ResB>(
        request: Option<&http::Request<ReqB>>,
        response: Option<&http::Response<ResB>>,
        levels: &TraceLevels,
    ) -> Result<Self, TraceError>
    where
        ReqB: AsRef<[u8]>,
        ResB: AsRef<[u8]>,
    {
        Self::capture(request, response, levels, default_truncate_len())
    }

    /// The request side, if any.
    pub fn request(&self) -> Option<&RequestData> {
        self.request.as_ref()
    }

    /// The response side, if any.
    pub fn response(&self) -> Option<&ResponseData> {
        self.response.as_ref()
    }
}

fn capture_request<R>(
    request: &R,
    levels: &TraceLevels,
    truncate_len: TruncateLength,
) -> Result<RequestData, TraceError>
where
    R: RequestSource + ?Sized,
{
    let mut builder = RequestDataBuilder::new();
    builder.with_command(request.command());

    let headers = levels
        .wants_headers(Side::Request)
        .then(|| request.headers())
        .flatten();
    let binary = capture_headers(&mut builder, headers);

    let body = request.body();
    capture_side_body(
        &mut builder,
        Side::Request,
        body.as_ref(),
        binary,
        levels,
        truncate_len,
    )?;

    Ok(builder.build().unwrap_or_default())
}

fn capture_response<R>(
    response: &R,
    levels: &TraceLevels,
    truncate_len: TruncateLength,
) -> Result<ResponseData, TraceError>
where
    R: ResponseSource + ?Sized,
{
    let mut builder = ResponseDataBuilder::new();
    builder.with_status(response.status());

    let headers = levels
        .wants_headers(Side::Response)
        .then(|| response.headers())
        .flatten();
    let binary = capture_headers(&mut builder, headers);

    let body = response.body();
    capture_side_body(
        &mut builder,
        Side::Response,
        body.as_ref(),
        binary,
        levels,
        truncate_len,
    )?;

    Ok(builder.build().unwrap_or_default())
}

/// Adds redacted headers, returning whether the body should be treated as binary.
fn capture_headers<T: PayloadData>(
    builder: &mut PayloadBuilder<T>,
    headers: Option<HeaderPairs<'_>>,
) -> bool {
    let Some(headers) = headers else {
        return false;
    };
    builder.ensure_headers();

    let mut binary = false;
    for (name, value) in headers {
        let redacted = redact_header(name, &value);
        binary |= redacted.binary_marker;
        builder.add_header(name, redacted.value);
    }
    binary
}

fn capture_side_body<T, B>(
    builder: &mut PayloadBuilder<T>,
    side: Side,
    body: Option<&B>,
    binary: bool,
    levels: &TraceLevels,
    truncate_len: TruncateLength,
) -> Result<(), TraceError>
where
    T: PayloadData,
    B: BodySource,
{
    let (Some(body), Some(mode)) = (body, levels.body_mode(side)) else {
        return Ok(());
    };

    let text = capture_body(Some(body), binary)?;
    let text = match mode {
        BodyMode::Full => text,
        BodyMode::Summary if binary => text,
        BodyMode::Summary => truncate(&text, truncate_len).into_owned(),
    };
    debug!(%side, ?mode, binary, len = text.len(), "captured body");
    builder.set_body(text);
    Ok(())
}
