//! Views over the transport's request and response types.
//!
//! Two transport shapes are supported:
//! - [`legacy`]: the pre-buffered message model ([`HttpRequest`], [`HttpResponse`],
//!   [`EntitySnapshot`]),
//! - [`modern`]: the `http` and `reqwest` types.
//!
//! Both implement [`RequestSource`] / [`ResponseSource`], so the capture algorithm is written
//! once against these traits.

use std::borrow::Cow;

use crate::body::BodySource;

pub mod legacy;
pub mod modern;

pub use self::legacy::{EntitySnapshot, HttpRequest, HttpResponse};
pub use self::modern::{BufferedBody, ReqwestBody, buffer_response};

/// Header name/value pairs in the order the transport exposes them.
pub type HeaderPairs<'a> = Vec<(&'a str, Cow<'a, str>)>;

/// The outgoing side of an exchange.
pub trait RequestSource {
    /// The body view handed to the body capturer.
    type Body<'a>: BodySource
    where
        Self: 'a;

    /// The HTTP method.
    fn method(&self) -> &str;

    /// The full request URL.
    fn url(&self) -> Cow<'_, str>;

    /// The request headers, or `None` when the transport does not expose them.
    fn headers(&self) -> Option<HeaderPairs<'_>>;

    /// The request body, if any.
    fn body(&self) -> Option<Self::Body<'_>>;

    /// The request line used as the snapshot identifier.
    fn command(&self) -> String {
        format!("{} {}", self.method(), self.url())
    }
}

/// The incoming side of an exchange.
pub trait ResponseSource {
    /// The body view handed to the body capturer.
    type Body<'a>: BodySource
    where
        Self: 'a;

    /// The status used as the snapshot identifier.
    fn status(&self) -> String;

    /// The response headers, or `None` when the transport does not expose them.
    fn headers(&self) -> Option<HeaderPairs<'_>>;

    /// The response body, if any.
    fn body(&self) -> Option<Self::Body<'_>>;
}
