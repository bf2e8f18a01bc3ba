use std::fmt;

/// Which side of an exchange a payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The outgoing request.
    Request,
    /// The incoming response.
    Response,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::Response => f.write_str("response"),
        }
    }
}

/// Errors that can occur while capturing or configuring an exchange trace.
///
/// Text decoding problems and odd header values never show up here: bodies that are
/// not UTF-8 fall back to hexadecimal, and header values are rendered lossily.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum TraceError {
    /// A body source could not be read.
    ///
    /// Occurs when the transport hands over a body that cannot be replayed,
    /// such as a streaming `reqwest` body.
    #[display("Failed to read {side} body: {message}")]
    #[from(skip)]
    SourceRead {
        /// The side whose body failed to read.
        side: Side,
        /// Description of the failure.
        message: String,
    },

    /// I/O error while buffering an entity.
    Io(std::io::Error),

    /// HTTP client error while buffering a live response.
    Reqwest(reqwest::Error),

    /// JSON serialization error while rendering a snapshot as JSON.
    Json(serde_json::Error),

    /// A trace level name could not be parsed.
    #[display("Unknown trace level '{value}'")]
    #[from(skip)]
    InvalidTraceLevel {
        /// The unrecognized token.
        value: String,
    },

    /// A truncation length could not be parsed.
    #[display("Invalid truncation length '{value}': expected a non-negative integer or -1")]
    #[from(skip)]
    InvalidTruncateLength {
        /// The rejected value.
        value: String,
    },
}
