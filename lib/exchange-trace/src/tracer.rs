use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::config::TraceConfig;
use crate::snapshot::ExchangeSnapshot;
use crate::source::{HttpRequest, HttpResponse, RequestSource, ResponseSource};

/// Receives rendered exchanges.
pub trait TraceSink {
    /// Emits one rendered exchange.
    fn emit(&self, rendered: &str);
}

/// Emits each exchange as a `tracing` event at `INFO`, target `exchange_trace`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn emit(&self, rendered: &str) {
        info!(target: "exchange_trace", exchange = %rendered, "http exchange");
    }
}

/// Captures, renders and emits exchanges without ever failing the caller.
///
/// Tracing is observational: a capture failure is logged at `WARN` and the exchange is skipped,
/// the traced request and response are left untouched.
///
/// # Example
///
/// ```rust
/// use exchange_trace::{TraceConfig, TraceLevel, TraceLevels, Tracer};
///
/// let config = TraceConfig::default()
///     .with_levels(TraceLevels::new().with(TraceLevel::Verbose))
///     .with_pretty(true);
/// let tracer = Tracer::new(config);
///
/// let request = http::Request::builder()
///     .method("POST")
///     .uri("https://api.example.com/sheets")
///     .body(r#"{"name":"Q3"}"#)?;
/// let response = http::Response::builder().status(201).body("{}")?;
///
/// assert!(tracer.trace_http(Some(&request), Some(&response)));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Tracer<S = TracingSink> {
    config: TraceConfig,
    sink: S,
}

impl Tracer {
    /// Creates a tracer emitting through [`TracingSink`].
    pub fn new(config: TraceConfig) -> Self {
        Self::with_sink(config, TracingSink)
    }
}

impl<S: TraceSink> Tracer<S> {
    /// Creates a tracer emitting through a custom sink.
    pub fn with_sink(config: TraceConfig, sink: S) -> Self {
        Self { config, sink }
    }

    /// The active configuration.
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// The sink receiving rendered exchanges.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Whether any trace level is enabled.
    pub fn is_enabled(&self) -> bool {
        !self.config.levels.is_empty()
    }

    /// Captures and emits one exchange from any transport shape.
    ///
    /// Returns `true` when an exchange was emitted.
    pub fn trace<Req, Res>(&self, request: Option<&Req>, response: Option<&Res>) -> bool
    where
        Req: RequestSource + ?Sized,
        Res: ResponseSource + ?Sized,
    {
        if !self.is_enabled() {
            return false;
        }

        let config = &self.config;
        match ExchangeSnapshot::capture(request, response, &config.levels, config.truncate_len) {
            Ok(snapshot) => {
                self.sink.emit(&snapshot.render(config.pretty));
                true
            }
            Err(error) => {
                warn!(%error, "failed to capture http exchange, trace skipped");
                false
            }
        }
    }

    /// Traces an exchange of the legacy message model.
    pub fn trace_legacy(
        &self,
        request: Option<&HttpRequest>,
        response: Option<&HttpResponse>,
    ) -> bool {
        self.trace(request, response)
    }

    /// Traces a `reqwest` request with its [buffered](crate::buffer_response) response.
    pub fn trace_reqwest(
        &self,
        request: Option<&reqwest::Request>,
        response: Option<&http::Response<Bytes>>,
    ) -> bool {
        if request.is_none() && response.is_some() {
            debug!("tracing reqwest response without its request");
        }
        self.trace(request, response)
    }

    /// Traces in-memory `http` types.
    pub fn trace_http<ReqB, ResB>(
        &self,
        request: Option<&http::Request<ReqB>>,
        response: Option<&http::Response<ResB>>,
    ) -> bool
    where
        ReqB: AsRef<[u8]>,
        ResB: AsRef<[u8]>,
    {
        self.trace(request, response)
    }
}
