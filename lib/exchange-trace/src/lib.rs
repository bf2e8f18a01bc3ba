//! # Exchange Trace
//!
//! Redacted, size-bounded snapshots of HTTP request/response exchanges for diagnostic logs.
//!
//! An exchange is captured into an [`ExchangeSnapshot`] according to a set of
//! [`TraceLevel`]s, then rendered as a compact or indented object-literal string:
//! - the `Authorization` header only shows its last 4 characters,
//! - a `Content-Disposition` header turns the body into a binary descriptor,
//! - body summaries are cut to a configurable length.
//!
//! Two transport shapes are supported, see [`source`].
//!
//! ## Quick Start
//!
//! ```rust
//! use exchange_trace::{ExchangeSnapshot, TraceLevel, TraceLevels};
//!
//! let request = http::Request::builder()
//!     .method("POST")
//!     .uri("https://api.example.com/sheets")
//!     .header("Authorization", "Bearer abcd1234wxyz")
//!     .body(r#"{"name":"Q3"}"#)?;
//! let response = http::Response::builder().status(200).body("{}")?;
//!
//! let levels: TraceLevels = "RequestHeaders, RequestBody, ResponseBody".parse()?;
//! let snapshot = ExchangeSnapshot::from_http(Some(&request), Some(&response), &levels)?;
//!
//! println!("{snapshot:#}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Logging
//!
//! [`Tracer`] wires capture and rendering to a [`TraceSink`], by default a `tracing` event
//! with target `exchange_trace`. It never fails the traced exchange.
//!
//! ```rust
//! use exchange_trace::{TraceConfig, Tracer};
//!
//! // EXCHANGE_TRACE_PARTS, EXCHANGE_TRACE_TRUNCATE_LEN, EXCHANGE_TRACE_PRETTY
//! let tracer = Tracer::new(TraceConfig::from_env()?);
//! assert_eq!(tracer.is_enabled(), !tracer.config().levels.is_empty());
//! # Ok::<(), exchange_trace::TraceError>(())
//! ```

mod body;
mod config;
mod error;
mod level;
mod payload;
mod redact;
mod render;
mod snapshot;
pub mod source;
mod tracer;

pub use self::body::{
    BodySource, TRUNCATION_MARKER, binary_descriptor, capture_body, content_as_text, truncate,
};
pub use self::config::{
    DEFAULT_TRUNCATE_LEN, ENV_PRETTY, ENV_TRACE_PARTS, ENV_TRUNCATE_LEN, TraceConfig,
    TruncateLength, default_truncate_len,
};
pub use self::error::{Side, TraceError};
pub use self::level::{TraceLevel, TraceLevels};
pub use self::payload::{
    HttpPayload, PayloadBuilder, PayloadData, RequestData, RequestDataBuilder, ResponseData,
    ResponseDataBuilder,
};
pub use self::redact::{MASKED_PREFIX, RedactedHeader, VISIBLE_SUFFIX_CHARS, redact_header};
pub use self::snapshot::ExchangeSnapshot;
pub use self::source::{
    BufferedBody, EntitySnapshot, HeaderPairs, HttpRequest, HttpResponse, RequestSource,
    ResponseSource, ReqwestBody, buffer_response,
};
pub use self::tracer::{TraceSink, Tracer, TracingSink};
