use std::collections::BTreeMap;

use serde::Serialize;

/// Headers and body captured for one side of an exchange.
///
/// `None` means the facet was not requested. `Some` with an empty map means headers were
/// requested but none were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HttpPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<String>,
}

impl HttpPayload {
    /// Captured headers, sorted by name.
    pub fn headers(&self) -> Option<&BTreeMap<String, String>> {
        self.headers.as_ref()
    }

    /// Captured body text.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Whether headers were requested.
    pub fn has_headers(&self) -> bool {
        self.headers.is_some()
    }

    /// Whether a body was requested.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}

/// The request side of an exchange snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, derive_more::Deref)]
pub struct RequestData {
    command: String,
    #[deref]
    #[serde(flatten)]
    payload: HttpPayload,
}

impl RequestData {
    /// The request line, `"{METHOD} {URL}"`.
    pub fn command(&self) -> &str {
        &self.command
    }
}

/// The response side of an exchange snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, derive_more::Deref)]
pub struct ResponseData {
    status: String,
    #[deref]
    #[serde(flatten)]
    payload: HttpPayload,
}

impl ResponseData {
    /// The response status, as text or numeric code depending on the transport.
    pub fn status(&self) -> &str {
        &self.status
    }
}

/// Payload types a [`PayloadBuilder`] can produce.
pub trait PayloadData: Default {
    /// The shared headers/body part.
    fn payload_mut(&mut self) -> &mut HttpPayload;
}

impl PayloadData for RequestData {
    fn payload_mut(&mut self) -> &mut HttpPayload {
        &mut self.payload
    }
}

impl PayloadData for ResponseData {
    fn payload_mut(&mut self) -> &mut HttpPayload {
        &mut self.payload
    }
}

/// Accumulates one side of one exchange.
///
/// Nothing is allocated until a field is set, so [`build`](Self::build) tells "nothing
/// captured" (`None`) apart from "captured but empty". Building hands the data over and leaves
/// the builder empty.
///
/// # Example
///
/// ```rust
/// use exchange_trace::RequestDataBuilder;
///
/// let mut builder = RequestDataBuilder::new();
/// assert!(builder.build().is_none());
///
/// builder
///     .with_command("GET https://api.example.com/sheets")
///     .add_header("Accept", "application/json");
/// let request = builder.build().expect("something was captured");
///
/// assert_eq!(request.command(), "GET https://api.example.com/sheets");
/// assert!(request.has_headers());
/// assert!(!request.has_body());
/// assert!(builder.build().is_none());
/// ```
#[derive(Debug)]
pub struct PayloadBuilder<T> {
    data: Option<T>,
}

/// Builder for [`RequestData`].
pub type RequestDataBuilder = PayloadBuilder<RequestData>;

/// Builder for [`ResponseData`].
pub type ResponseDataBuilder = PayloadBuilder<ResponseData>;

impl<T> Default for PayloadBuilder<T> {
    fn default() -> Self {
        Self { data: None }
    }
}

impl<T: PayloadData> PayloadBuilder<T> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn data_mut(&mut self) -> &mut T {
        self.data.get_or_insert_with(T::default)
    }

    /// Marks headers as requested, even if none get added.
    pub fn ensure_headers(&mut self) -> &mut Self {
        self.data_mut()
            .payload_mut()
            .headers
            .get_or_insert_with(BTreeMap::new);
        self
    }

    /// Adds or replaces a header.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.data_mut()
            .payload_mut()
            .headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Sets the body text.
    pub fn set_body(&mut self, body: impl Into<String>) -> &mut Self {
        self.data_mut().payload_mut().body = Some(body.into());
        self
    }

    /// Returns what was accumulated and resets the builder.
    pub fn build(&mut self) -> Option<T> {
        self.data.take()
    }
}

impl PayloadBuilder<RequestData> {
    /// Sets the request line.
    pub fn with_command(&mut self, command: impl Into<String>) -> &mut Self {
        self.data_mut().command = command.into();
        self
    }
}

impl PayloadBuilder<ResponseData> {
    /// Sets the response status.
    pub fn with_status(&mut self, status: impl Into<String>) -> &mut Self {
        self.data_mut().status = status.into();
        self
    }
}
