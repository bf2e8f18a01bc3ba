use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Side, TraceError};

/// A facet of an exchange that can be captured.
///
/// The six primitive levels select headers, full body or truncated body for each side.
/// The composite levels (`None`, `Request`, `Response`, `Terse`, `Verbose`) are shorthands
/// that expand into primitive levels when inserted into a [`TraceLevels`] set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TraceLevel {
    /// Request headers, with the `Authorization` value masked.
    RequestHeaders,
    /// The full request body.
    RequestBody,
    /// The request body, truncated to the configured length.
    RequestBodySummary,
    /// Response headers.
    ResponseHeaders,
    /// The full response body.
    ResponseBody,
    /// The response body, truncated to the configured length.
    ResponseBodySummary,
    /// Trace nothing.
    None,
    /// Request headers and request body summary.
    Request,
    /// Response headers and response body summary.
    Response,
    /// Body summaries of both sides.
    Terse,
    /// Headers and full bodies of both sides.
    Verbose,
}

impl TraceLevel {
    /// Every level, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::RequestHeaders,
        Self::RequestBody,
        Self::RequestBodySummary,
        Self::ResponseHeaders,
        Self::ResponseBody,
        Self::ResponseBodySummary,
        Self::None,
        Self::Request,
        Self::Response,
        Self::Terse,
        Self::Verbose,
    ];

    /// Returns the primitive levels this level stands for.
    pub fn expand(self) -> &'static [Self] {
        match self {
            Self::RequestHeaders => &[Self::RequestHeaders],
            Self::RequestBody => &[Self::RequestBody],
            Self::RequestBodySummary => &[Self::RequestBodySummary],
            Self::ResponseHeaders => &[Self::ResponseHeaders],
            Self::ResponseBody => &[Self::ResponseBody],
            Self::ResponseBodySummary => &[Self::ResponseBodySummary],
            Self::None => &[],
            Self::Request => &[Self::RequestHeaders, Self::RequestBodySummary],
            Self::Response => &[Self::ResponseHeaders, Self::ResponseBodySummary],
            Self::Terse => &[Self::RequestBodySummary, Self::ResponseBodySummary],
            Self::Verbose => &[
                Self::RequestHeaders,
                Self::RequestBody,
                Self::ResponseHeaders,
                Self::ResponseBody,
            ],
        }
    }

    /// Whether this level is stored as-is in a [`TraceLevels`] set.
    pub fn is_primitive(self) -> bool {
        matches!(self.expand(), [single] if *single == self)
    }

    /// The canonical name of the level.
    pub fn name(self) -> &'static str {
        match self {
            Self::RequestHeaders => "RequestHeaders",
            Self::RequestBody => "RequestBody",
            Self::RequestBodySummary => "RequestBodySummary",
            Self::ResponseHeaders => "ResponseHeaders",
            Self::ResponseBody => "ResponseBody",
            Self::ResponseBodySummary => "ResponseBodySummary",
            Self::None => "None",
            Self::Request => "Request",
            Self::Response => "Response",
            Self::Terse => "Terse",
            Self::Verbose => "Verbose",
        }
    }

    fn headers(side: Side) -> Self {
        match side {
            Side::Request => Self::RequestHeaders,
            Side::Response => Self::ResponseHeaders,
        }
    }

    fn body(side: Side) -> Self {
        match side {
            Side::Request => Self::RequestBody,
            Side::Response => Self::ResponseBody,
        }
    }

    fn body_summary(side: Side) -> Self {
        match side {
            Side::Request => Self::RequestBodySummary,
            Side::Response => Self::ResponseBodySummary,
        }
    }
}

impl fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TraceLevel {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| TraceError::InvalidTraceLevel {
                value: s.to_string(),
            })
    }
}

/// How a side's body is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyMode {
    Full,
    Summary,
}

/// The set of enabled trace levels.
///
/// Only primitive levels are stored; composite levels are expanded on insertion.
///
/// # Example
///
/// ```rust
/// use exchange_trace::{TraceLevel, TraceLevels};
///
/// let levels: TraceLevels = "Request, ResponseBody".parse()?;
///
/// assert!(levels.contains(TraceLevel::RequestHeaders));
/// assert!(levels.contains(TraceLevel::RequestBodySummary));
/// assert!(levels.contains(TraceLevel::ResponseBody));
/// assert!(!levels.contains(TraceLevel::ResponseHeaders));
/// # Ok::<(), exchange_trace::TraceError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TraceLevels(BTreeSet<TraceLevel>);

impl TraceLevels {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every primitive level: headers and full bodies of both sides, plus both summaries.
    pub fn all() -> Self {
        TraceLevel::ALL.into_iter().collect()
    }

    /// Adds a level, returning the set.
    #[must_use]
    pub fn with(mut self, level: TraceLevel) -> Self {
        self.insert(level);
        self
    }

    /// Adds a level, expanding composites.
    pub fn insert(&mut self, level: TraceLevel) {
        self.0.extend(level.expand().iter().copied());
    }

    /// Whether every primitive level behind `level` is enabled.
    ///
    /// [`TraceLevel::None`] is contained only in the empty set.
    pub fn contains(&self, level: TraceLevel) -> bool {
        match level {
            TraceLevel::None => self.0.is_empty(),
            _ => level.expand().iter().all(|it| self.0.contains(it)),
        }
    }

    /// Whether no level is enabled.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the enabled primitive levels in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = TraceLevel> + '_ {
        self.0.iter().copied()
    }

    pub(crate) fn wants_headers(&self, side: Side) -> bool {
        self.0.contains(&TraceLevel::headers(side))
    }

    pub(crate) fn body_mode(&self, side: Side) -> Option<BodyMode> {
        if self.0.contains(&TraceLevel::body(side)) {
            Some(BodyMode::Full)
        } else if self.0.contains(&TraceLevel::body_summary(side)) {
            Some(BodyMode::Summary)
        } else {
            None
        }
    }
}

impl FromIterator<TraceLevel> for TraceLevels {
    fn from_iter<T: IntoIterator<Item = TraceLevel>>(iter: T) -> Self {
        let mut result = Self::new();
        result.extend(iter);
        result
    }
}

impl Extend<TraceLevel> for TraceLevels {
    fn extend<T: IntoIterator<Item = TraceLevel>>(&mut self, iter: T) {
        for level in iter {
            self.insert(level);
        }
    }
}

impl FromStr for TraceLevels {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .filter(|token| !token.trim().is_empty())
            .map(str::parse::<TraceLevel>)
            .collect()
    }
}

impl fmt::Display for TraceLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for level in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            first = false;
            f.write_str(level.name())?;
        }
        Ok(())
    }
}

impl Serialize for TraceLevels {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TraceLevels {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("RequestHeaders", TraceLevel::RequestHeaders)]
    #[case("requestbodysummary", TraceLevel::RequestBodySummary)]
    #[case("  VERBOSE ", TraceLevel::Verbose)]
    #[case("none", TraceLevel::None)]
    fn test_parse_level_ignores_case(#[case] input: &str, #[case] expected: TraceLevel) {
        let level = input.parse::<TraceLevel>().expect("should parse");

        assert_eq!(level, expected);
    }

    #[test]
    fn test_parse_unknown_level_fails() {
        let error = "RequestFooter".parse::<TraceLevel>().expect_err("should fail");

        insta::assert_snapshot!(error, @"Unknown trace level 'RequestFooter'");
    }

    #[test]
    fn test_composites_expand_on_insert() {
        let levels = TraceLevels::new().with(TraceLevel::Verbose);

        insta::assert_snapshot!(levels, @"RequestHeaders,RequestBody,ResponseHeaders,ResponseBody");
        assert!(levels.contains(TraceLevel::Verbose));
        assert!(!levels.contains(TraceLevel::Request));
    }

    #[test]
    fn test_none_is_only_contained_in_empty_set() {
        assert!(TraceLevels::new().contains(TraceLevel::None));
        assert!(TraceLevels::new().with(TraceLevel::None).is_empty());
        assert!(!TraceLevels::new().with(TraceLevel::Terse).contains(TraceLevel::None));
    }

    #[test]
    fn test_duplicates_are_impossible() {
        let levels: TraceLevels = [
            TraceLevel::RequestHeaders,
            TraceLevel::Request,
            TraceLevel::RequestHeaders,
        ]
        .into_iter()
        .collect();

        assert_eq!(levels.iter().count(), 2);
    }

    #[test]
    fn test_parse_list_skips_blank_segments() {
        let levels: TraceLevels = "ResponseHeaders,, responsebody ,".parse().expect("should parse");

        insta::assert_snapshot!(levels, @"ResponseHeaders,ResponseBody");
    }

    #[test]
    fn test_all_contains_every_primitive() {
        let levels = TraceLevels::all();

        insta::assert_snapshot!(levels, @"RequestHeaders,RequestBody,RequestBodySummary,ResponseHeaders,ResponseBody,ResponseBodySummary");
    }

    #[rstest]
    #[case("RequestBody", Some(BodyMode::Full))]
    #[case("RequestBodySummary", Some(BodyMode::Summary))]
    #[case("RequestBody,RequestBodySummary", Some(BodyMode::Full))]
    #[case("ResponseBody", None)]
    #[case("", None)]
    fn test_request_body_mode(#[case] input: &str, #[case] expected: Option<BodyMode>) {
        let levels: TraceLevels = input.parse().expect("should parse");

        assert_eq!(levels.body_mode(Side::Request), expected);
    }

    #[test]
    fn test_serde_uses_text_form() {
        let levels = TraceLevels::new().with(TraceLevel::Terse);

        let json = serde_json::to_string(&levels).expect("should serialize");
        insta::assert_snapshot!(json, @r#""RequestBodySummary,ResponseBodySummary""#);

        let back: TraceLevels = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(back, levels);
    }
}
