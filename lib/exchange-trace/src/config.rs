use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::TraceError;
use crate::level::TraceLevels;

/// Environment variable holding the enabled trace levels, e.g. `"RequestHeaders,ResponseBody"`.
pub const ENV_TRACE_PARTS: &str = "EXCHANGE_TRACE_PARTS";

/// Environment variable holding the summary truncation length (`-1` disables truncation).
pub const ENV_TRUNCATE_LEN: &str = "EXCHANGE_TRACE_TRUNCATE_LEN";

/// Environment variable enabling pretty rendering (`true`/`1`/`yes`/`on`).
pub const ENV_PRETTY: &str = "EXCHANGE_TRACE_PRETTY";

/// Maximum number of characters kept by a body summary, unless configured otherwise.
pub const DEFAULT_TRUNCATE_LEN: usize = 1024;

static PROCESS_TRUNCATE_LEN: OnceLock<TruncateLength> = OnceLock::new();

/// Maximum length of a body summary.
///
/// Configuration sources use `-1` for "unbounded".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TruncateLength(Option<usize>);

impl TruncateLength {
    /// No truncation.
    pub const UNBOUNDED: Self = Self(None);

    /// Truncates to `max_len` characters.
    pub const fn new(max_len: usize) -> Self {
        Self(Some(max_len))
    }

    /// The character limit, or `None` when unbounded.
    pub const fn limit(self) -> Option<usize> {
        self.0
    }
}

impl Default for TruncateLength {
    fn default() -> Self {
        Self::new(DEFAULT_TRUNCATE_LEN)
    }
}

impl From<usize> for TruncateLength {
    fn from(value: usize) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for TruncateLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(max_len) => write!(f, "{max_len}"),
            None => f.write_str("-1"),
        }
    }
}

impl FromStr for TruncateLength {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "-1" {
            return Ok(Self::UNBOUNDED);
        }
        s.parse::<usize>()
            .map(Self::new)
            .map_err(|_| TraceError::InvalidTruncateLength {
                value: s.to_string(),
            })
    }
}

impl Serialize for TruncateLength {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.0 {
            Some(max_len) => serializer.serialize_u64(max_len as u64),
            None => serializer.serialize_i64(-1),
        }
    }
}

impl<'de> Deserialize<'de> for TruncateLength {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        match raw {
            -1 => Ok(Self::UNBOUNDED),
            _ => usize::try_from(raw).map(Self::new).map_err(|_| {
                serde::de::Error::custom(TraceError::InvalidTruncateLength {
                    value: raw.to_string(),
                })
            }),
        }
    }
}

/// The process-wide summary length.
///
/// Read once from [`ENV_TRUNCATE_LEN`]; an unset or invalid value falls back to
/// [`DEFAULT_TRUNCATE_LEN`].
pub fn default_truncate_len() -> TruncateLength {
    *PROCESS_TRUNCATE_LEN.get_or_init(|| match std::env::var(ENV_TRUNCATE_LEN) {
        Ok(raw) => raw.parse().unwrap_or_else(|error| {
            warn!(%error, variable = ENV_TRUNCATE_LEN, "ignoring invalid truncation length");
            TruncateLength::default()
        }),
        Err(_) => TruncateLength::default(),
    })
}

/// What to capture and how to render it.
///
/// # Example
///
/// ```rust
/// use exchange_trace::{TraceConfig, TraceLevel, TraceLevels, TruncateLength};
///
/// let config = TraceConfig::default()
///     .with_levels(TraceLevels::new().with(TraceLevel::Terse))
///     .with_truncate_len(TruncateLength::new(256))
///     .with_pretty(true);
///
/// assert!(config.levels.contains(TraceLevel::RequestBodySummary));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Enabled trace levels; empty means tracing is off.
    pub levels: TraceLevels,
    /// Summary length used by the `*BodySummary` levels.
    pub truncate_len: TruncateLength,
    /// Whether rendered snapshots are indented.
    pub pretty: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            levels: TraceLevels::default(),
            truncate_len: default_truncate_len(),
            pretty: false,
        }
    }
}

impl TraceConfig {
    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails when a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, TraceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Fails when a variable is set to an unparsable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TraceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut result = Self::default();
        if let Some(parts) = lookup(ENV_TRACE_PARTS) {
            result.levels = parts.parse()?;
        }
        if let Some(truncate_len) = lookup(ENV_TRUNCATE_LEN) {
            result.truncate_len = truncate_len.parse()?;
        }
        if let Some(pretty) = lookup(ENV_PRETTY) {
            result.pretty = matches!(
                pretty.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "yes" | "on"
            );
        }
        Ok(result)
    }

    /// Sets the enabled levels.
    #[must_use]
    pub fn with_levels(mut self, levels: TraceLevels) -> Self {
        self.levels = levels;
        self
    }

    /// Sets the summary length.
    #[must_use]
    pub fn with_truncate_len(mut self, truncate_len: impl Into<TruncateLength>) -> Self {
        self.truncate_len = truncate_len.into();
        self
    }

    /// Enables or disables pretty rendering.
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use super::*;
    use crate::level::TraceLevel;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[rstest]
    #[case("1024", TruncateLength::new(1024))]
    #[case("0", TruncateLength::new(0))]
    #[case(" -1 ", TruncateLength::UNBOUNDED)]
    fn test_parse_truncate_length(#[case] input: &str, #[case] expected: TruncateLength) {
        let parsed = input.parse::<TruncateLength>().expect("should parse");

        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case("-2")]
    #[case("lots")]
    #[case("")]
    fn test_parse_invalid_truncate_length(#[case] input: &str) {
        let error = input.parse::<TruncateLength>().expect_err("should fail");

        assert!(matches!(error, TraceError::InvalidTruncateLength { .. }));
    }

    #[test]
    fn test_from_lookup_reads_every_variable() {
        let config = TraceConfig::from_lookup(lookup(&[
            (ENV_TRACE_PARTS, "Request,ResponseBody"),
            (ENV_TRUNCATE_LEN, "-1"),
            (ENV_PRETTY, "TRUE"),
        ]))
        .expect("should load");

        assert!(config.levels.contains(TraceLevel::Request));
        assert!(config.levels.contains(TraceLevel::ResponseBody));
        assert_eq!(config.truncate_len, TruncateLength::UNBOUNDED);
        assert!(config.pretty);
    }

    #[test]
    fn test_from_lookup_keeps_defaults_when_unset() {
        let config = TraceConfig::from_lookup(lookup(&[])).expect("should load");

        assert!(config.levels.is_empty());
        assert_eq!(config.truncate_len, default_truncate_len());
        assert!(!config.pretty);
    }

    #[test]
    fn test_from_lookup_rejects_unknown_level() {
        let error = TraceConfig::from_lookup(lookup(&[(ENV_TRACE_PARTS, "Everything")]))
            .expect_err("should fail");

        insta::assert_snapshot!(error, @"Unknown trace level 'Everything'");
    }

    #[test]
    fn test_config_deserializes_from_json() {
        let config: TraceConfig = serde_json::from_str(
            r#"{"levels": "Verbose", "truncate_len": -1, "pretty": true}"#,
        )
        .expect("should deserialize");

        assert!(config.levels.contains(TraceLevel::Verbose));
        assert_eq!(config.truncate_len, TruncateLength::UNBOUNDED);
        assert!(config.pretty);
    }

    #[test]
    fn test_config_rejects_negative_length() {
        let result = serde_json::from_str::<TraceConfig>(r#"{"truncate_len": -5}"#);

        assert!(result.is_err());
    }
}
