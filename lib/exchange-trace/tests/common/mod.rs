use bytes::Bytes;
use exchange_trace::{
    EntitySnapshot, ExchangeSnapshot, HttpRequest, HttpResponse, TraceLevels, TruncateLength,
};
use http::header::CONTENT_TYPE;
use http::{HeaderName, HeaderValue, Method, StatusCode};
use rstest::fixture;
use tracing::info;

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

/// The transport shapes an exchange can be handed over with.
#[derive(Debug, Clone, Copy)]
pub enum Adapter {
    Legacy,
    Http,
    Reqwest,
}

/// One exchange described independently of the transport.
///
/// Header names are lowercase so every adapter records them the same way.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub method: Method,
    pub url: String,
    pub request_headers: Vec<(String, String)>,
    pub request_body: Bytes,
    pub status: StatusCode,
    pub response_headers: Vec<(String, String)>,
    pub response_body: Bytes,
}

impl Exchange {
    pub fn new(method: Method, url: &str) -> Self {
        Self {
            method,
            url: url.to_string(),
            request_headers: Vec::new(),
            request_body: Bytes::new(),
            status: StatusCode::OK,
            response_headers: Vec::new(),
            response_body: Bytes::new(),
        }
    }

    pub fn request_header(mut self, name: &str, value: &str) -> Self {
        self.request_headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn request_body(mut self, body: impl Into<Bytes>) -> Self {
        self.request_body = body.into();
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn response_header(mut self, name: &str, value: &str) -> Self {
        self.response_headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn response_body(mut self, body: impl Into<Bytes>) -> Self {
        self.response_body = body.into();
        self
    }

    pub fn legacy(&self) -> anyhow::Result<(HttpRequest, HttpResponse)> {
        let mut request = HttpRequest::new(self.method.clone(), self.url.parse()?);
        for (name, value) in &self.request_headers {
            request = request.with_header(name, value);
        }
        let request = request.with_entity(entity(&self.request_headers, &self.request_body));

        let mut response = HttpResponse::new(self.status)
            .with_status_text(self.status.as_u16().to_string())
            .with_entity(entity(&self.response_headers, &self.response_body));
        for (name, value) in &self.response_headers {
            response = response.with_header(name, value);
        }

        Ok((request, response))
    }

    pub fn http(&self) -> anyhow::Result<(http::Request<Bytes>, http::Response<Bytes>)> {
        let mut request = http::Request::builder()
            .method(self.method.clone())
            .uri(&self.url);
        for (name, value) in &self.request_headers {
            request = request.header(name, value);
        }
        let request = request.body(self.request_body.clone())?;

        Ok((request, self.http_response()?))
    }

    pub fn http_response(&self) -> anyhow::Result<http::Response<Bytes>> {
        let mut response = http::Response::builder().status(self.status);
        for (name, value) in &self.response_headers {
            response = response.header(name, value);
        }
        Ok(response.body(self.response_body.clone())?)
    }

    pub fn reqwest(&self) -> anyhow::Result<(reqwest::Request, http::Response<Bytes>)> {
        let mut request = reqwest::Request::new(self.method.clone(), self.url.parse()?);
        for (name, value) in &self.request_headers {
            request.headers_mut().append(
                HeaderName::try_from(name.as_str())?,
                HeaderValue::from_str(value)?,
            );
        }
        *request.body_mut() = Some(reqwest::Body::from(self.request_body.clone()));

        Ok((request, self.http_response()?))
    }
}

fn entity(headers: &[(String, String)], content: &Bytes) -> EntitySnapshot {
    let content_type = headers
        .iter()
        .find(|(name, _)| name == CONTENT_TYPE.as_str())
        .map(|(_, value)| value.clone());
    let entity = EntitySnapshot::new(content.clone());
    match content_type {
        Some(content_type) => entity.with_content_type(content_type),
        None => entity,
    }
}

impl Adapter {
    pub fn capture(
        self,
        exchange: &Exchange,
        levels: &TraceLevels,
        truncate_len: TruncateLength,
    ) -> anyhow::Result<ExchangeSnapshot> {
        let snapshot = match self {
            Self::Legacy => {
                let (request, response) = exchange.legacy()?;
                ExchangeSnapshot::capture(Some(&request), Some(&response), levels, truncate_len)?
            }
            Self::Http => {
                let (request, response) = exchange.http()?;
                ExchangeSnapshot::capture(Some(&request), Some(&response), levels, truncate_len)?
            }
            Self::Reqwest => {
                let (request, response) = exchange.reqwest()?;
                ExchangeSnapshot::capture(Some(&request), Some(&response), levels, truncate_len)?
            }
        };
        Ok(snapshot)
    }
}

pub fn levels(input: &str) -> TraceLevels {
    match input.parse() {
        Ok(levels) => levels,
        Err(error) => panic!("invalid trace levels '{input}': {error}"),
    }
}

#[fixture]
pub fn sheets_exchange() -> Exchange {
    init_tracing();
    Exchange::new(Method::GET, "https://api.example.com/sheets")
        .request_header("authorization", "Bearer abcd1234wxyz")
        .request_header("content-type", "application/json")
        .request_body("{}")
        .response_header("content-type", "application/json")
        .response_body(r#"{"data":[]}"#)
}

#[fixture]
pub fn attachment_exchange() -> Exchange {
    init_tracing();
    Exchange::new(Method::POST, "https://api.example.com/sheets/42/attachments")
        .request_header("authorization", "Bearer abcd1234wxyz")
        .request_header("content-disposition", "attachment; filename=\"report.pdf\"")
        .request_header("content-type", "application/pdf")
        .request_body(vec![0x25, 0x50, 0x44, 0x46, 0x2d, 0xff, 0xfe])
        .status(StatusCode::CREATED)
}

/// A download answered with an attachment of 4 bytes.
pub fn download_exchange(content_type: &str) -> Exchange {
    init_tracing();
    Exchange::new(Method::GET, "https://api.example.com/sheets/42/attachments/7")
        .request_header("authorization", "Bearer abcd1234wxyz")
        .response_header("content-disposition", "attachment; filename=\"export.bin\"")
        .response_header("content-type", content_type)
        .response_body(&b"a,b\n"[..])
}
