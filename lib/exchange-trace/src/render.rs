use std::fmt::{self, Write};

use crate::error::TraceError;
use crate::payload::HttpPayload;
use crate::snapshot::ExchangeSnapshot;

const INDENT: &str = "  ";

/// Writes the object-literal form: single-quoted values, trailing commas allowed.
struct LiteralWriter<'w, W> {
    out: &'w mut W,
    pretty: bool,
}

impl<W: Write> LiteralWriter<'_, W> {
    fn indent(&mut self, depth: usize) -> fmt::Result {
        if self.pretty {
            for _ in 0..depth {
                self.out.write_str(INDENT)?;
            }
        }
        Ok(())
    }

    fn line(&mut self, depth: usize, content: fmt::Arguments<'_>) -> fmt::Result {
        self.indent(depth)?;
        self.out.write_fmt(content)?;
        if self.pretty {
            self.out.write_char('\n')?;
        }
        Ok(())
    }

    fn payload(&mut self, payload: &HttpPayload) -> fmt::Result {
        if let Some(headers) = payload.headers() {
            self.line(2, format_args!("headers:{{"))?;
            for (name, value) in headers {
                self.line(3, format_args!("'{name}':'{value}',"))?;
            }
            self.line(2, format_args!("}},"))?;
        }
        if let Some(body) = payload.body() {
            self.line(2, format_args!("body:'{body}'"))?;
        }
        Ok(())
    }

    fn snapshot(&mut self, snapshot: &ExchangeSnapshot) -> fmt::Result {
        self.line(0, format_args!("{{"))?;

        if let Some(request) = snapshot.request() {
            self.line(1, format_args!("request:{{"))?;
            self.line(2, format_args!("command:'{}',", request.command()))?;
            self.payload(request)?;
            self.line(1, format_args!("}},"))?;
        } else {
            self.line(1, format_args!("request:null,"))?;
        }

        if let Some(response) = snapshot.response() {
            self.line(1, format_args!("response:{{"))?;
            self.line(2, format_args!("status:'{}',", response.status()))?;
            self.payload(response)?;
            self.line(1, format_args!("}}"))?;
        } else {
            self.line(1, format_args!("response:null"))?;
        }

        self.out.write_char('}')
    }
}

/// Compact by default; the alternate flag (`{:#}`) renders the indented form.
impl fmt::Display for ExchangeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pretty = f.alternate();
        LiteralWriter { out: f, pretty }.snapshot(self)
    }
}

impl ExchangeSnapshot {
    /// Renders the snapshot for a human reader.
    ///
    /// Fields that were never requested are left out. `pretty` puts one field per line with
    /// two-space indentation; otherwise everything is on one line.
    pub fn render(&self, pretty: bool) -> String {
        if pretty {
            format!("{self:#}")
        } else {
            self.to_string()
        }
    }

    /// Serializes the snapshot as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, TraceError> {
        let json = serde_json::to_string(self)?;
        Ok(json)
    }
}
