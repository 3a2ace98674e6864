//! Matching strategies and matcher value objects.
//!
//! WireMock keys a whole-URL match and a named-field match with different
//! tag vocabularies, so the two families live in separate closed enums.

use crate::error::StubError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// How the request URL is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UrlMatchingStrategy {
    /// Exact match on path and query (`url`)
    #[serde(rename = "url")]
    EqualTo,
    /// Exact match on the path only (`urlPath`)
    #[serde(rename = "urlPath")]
    PathEqualTo,
    /// Regex match on the path only (`urlPathPattern`)
    #[serde(rename = "urlPathPattern")]
    PathMatching,
    /// Regex match on path and query (`urlPattern`)
    #[serde(rename = "urlPattern")]
    Matching,
}

impl UrlMatchingStrategy {
    pub const ALL: [Self; 4] = [
        Self::EqualTo,
        Self::PathEqualTo,
        Self::PathMatching,
        Self::Matching,
    ];

    /// The tag used as the request key in a mapping.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EqualTo => "url",
            Self::PathEqualTo => "urlPath",
            Self::PathMatching => "urlPathPattern",
            Self::Matching => "urlPattern",
        }
    }
}

/// How a header, cookie, query parameter or body is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamMatchingStrategy {
    EqualTo,
    Matches,
    Contains,
    EqualToXml,
    EqualToJson,
    MatchesXPath,
    MatchesJsonPath,
    Absent,
    DoesNotMatch,
}

impl ParamMatchingStrategy {
    pub const ALL: [Self; 9] = [
        Self::EqualTo,
        Self::Matches,
        Self::Contains,
        Self::EqualToXml,
        Self::EqualToJson,
        Self::MatchesXPath,
        Self::MatchesJsonPath,
        Self::Absent,
        Self::DoesNotMatch,
    ];

    /// The tag used as the matcher key in a mapping.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EqualTo => "equalTo",
            Self::Matches => "matches",
            Self::Contains => "contains",
            Self::EqualToXml => "equalToXml",
            Self::EqualToJson => "equalToJson",
            Self::MatchesXPath => "matchesXPath",
            Self::MatchesJsonPath => "matchesJsonPath",
            Self::Absent => "absent",
            Self::DoesNotMatch => "doesNotMatch",
        }
    }
}

impl fmt::Display for UrlMatchingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ParamMatchingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrlMatchingStrategy {
    type Err = StubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| StubError::UnknownStrategy(s.to_string()))
    }
}

impl FromStr for ParamMatchingStrategy {
    type Err = StubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| StubError::UnknownStrategy(s.to_string()))
    }
}

/// A URL strategy paired with the value it compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatcher {
    strategy: UrlMatchingStrategy,
    value: String,
}

impl UrlMatcher {
    pub fn new(strategy: UrlMatchingStrategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    pub fn strategy(&self) -> UrlMatchingStrategy {
        self.strategy
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A parameter strategy paired with the value it compares against.
///
/// The value is passed to the server untouched; a `matchesXPath` value is
/// never parsed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamMatcher {
    strategy: ParamMatchingStrategy,
    value: String,
}

impl ParamMatcher {
    pub fn new(strategy: ParamMatchingStrategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    pub fn strategy(&self) -> ParamMatchingStrategy {
        self.strategy
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Single-entry object `{"<tag>": "<value>"}`.
    pub(crate) fn to_value(&self) -> Value {
        let mut entry = Map::with_capacity(1);
        entry.insert(
            self.strategy.as_str().to_string(),
            Value::String(self.value.clone()),
        );
        Value::Object(entry)
    }
}

/// Exact match on path and query.
pub fn url_equal_to(url: impl Into<String>) -> UrlMatcher {
    UrlMatcher::new(UrlMatchingStrategy::EqualTo, url)
}

/// Exact match on the path only.
pub fn url_path_equal_to(path: impl Into<String>) -> UrlMatcher {
    UrlMatcher::new(UrlMatchingStrategy::PathEqualTo, path)
}

/// Regex match on the path only.
pub fn url_path_matching(pattern: impl Into<String>) -> UrlMatcher {
    UrlMatcher::new(UrlMatchingStrategy::PathMatching, pattern)
}

/// Regex match on path and query.
pub fn url_matching(pattern: impl Into<String>) -> UrlMatcher {
    UrlMatcher::new(UrlMatchingStrategy::Matching, pattern)
}

/// Exact match.
pub fn equal_to(value: impl Into<String>) -> ParamMatcher {
    ParamMatcher::new(ParamMatchingStrategy::EqualTo, value)
}

/// Regex match.
pub fn matching(pattern: impl Into<String>) -> ParamMatcher {
    ParamMatcher::new(ParamMatchingStrategy::Matches, pattern)
}

/// Substring match.
pub fn contains(value: impl Into<String>) -> ParamMatcher {
    ParamMatcher::new(ParamMatchingStrategy::Contains, value)
}

/// Semantic XML equality.
pub fn equal_to_xml(xml: impl Into<String>) -> ParamMatcher {
    ParamMatcher::new(ParamMatchingStrategy::EqualToXml, xml)
}

/// Semantic JSON equality.
pub fn equal_to_json(json: impl Into<String>) -> ParamMatcher {
    ParamMatcher::new(ParamMatchingStrategy::EqualToJson, json)
}

/// XPath expression that must select something.
pub fn matching_xpath(xpath: impl Into<String>) -> ParamMatcher {
    ParamMatcher::new(ParamMatchingStrategy::MatchesXPath, xpath)
}

/// JSON path expression that must select something.
pub fn matching_json_path(path: impl Into<String>) -> ParamMatcher {
    ParamMatcher::new(ParamMatchingStrategy::MatchesJsonPath, path)
}

/// Negated regex match.
pub fn not_matching(pattern: impl Into<String>) -> ParamMatcher {
    ParamMatcher::new(ParamMatchingStrategy::DoesNotMatch, pattern)
}
