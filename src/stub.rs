//! Stub rule builder.
//!
//! A [`StubRule`] collects a request pattern, a canned response and the
//! optional scenario fields, then flattens itself into the JSON document
//! accepted by the WireMock admin API (`POST /__admin/mappings`).
//!
//! ```
//! use wiremock_stub::{equal_to, url_equal_to, StubRule};
//!
//! let rule = StubRule::post(url_equal_to("/things"))
//!     .with_header("X-Key", equal_to("abc"))
//!     .will_return("{}", [("Content-Type", "application/json")], 201);
//!
//! let json = rule.to_json().unwrap();
//! assert!(json.contains("\"status\":201"));
//! ```

use crate::error::{Result, StubError};
use crate::matching::{ParamMatcher, UrlMatcher};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Conventional initial state of every WireMock scenario.
pub const SCENARIO_STATE_STARTED: &str = "Started";

/// HTTP method a stub responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
    /// WireMock wildcard, matches every method
    Any,
}

impl Method {
    pub const ALL: [Self; 9] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Patch,
        Self::Head,
        Self::Options,
        Self::Trace,
        Self::Any,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
            Self::Any => "ANY",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = StubError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| StubError::UnknownMethod(s.to_string()))
    }
}

impl TryFrom<String> for Method {
    type Error = StubError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// What an incoming request must look like for the stub to fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    method: Method,
    url_matcher: UrlMatcher,
    headers: BTreeMap<String, ParamMatcher>,
    cookies: BTreeMap<String, ParamMatcher>,
    query_params: BTreeMap<String, ParamMatcher>,
    body_patterns: Vec<ParamMatcher>,
}

impl RequestSpec {
    fn new(method: Method, url_matcher: UrlMatcher) -> Self {
        Self {
            method,
            url_matcher,
            headers: BTreeMap::new(),
            cookies: BTreeMap::new(),
            query_params: BTreeMap::new(),
            body_patterns: Vec::new(),
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url_matcher(&self) -> &UrlMatcher {
        &self.url_matcher
    }

    pub fn headers(&self) -> &BTreeMap<String, ParamMatcher> {
        &self.headers
    }

    pub fn cookies(&self) -> &BTreeMap<String, ParamMatcher> {
        &self.cookies
    }

    pub fn query_params(&self) -> &BTreeMap<String, ParamMatcher> {
        &self.query_params
    }

    pub fn body_patterns(&self) -> &[ParamMatcher] {
        &self.body_patterns
    }

    /// Build the `request` object of a mapping.
    ///
    /// Also usable on its own as the request pattern for the
    /// `/__admin/requests/count` and `/__admin/requests/find` endpoints.
    pub fn to_value(&self) -> Value {
        let mut request = Map::new();
        request.insert(
            "method".to_string(),
            Value::String(self.method.as_str().to_string()),
        );
        request.insert(
            self.url_matcher.strategy().as_str().to_string(),
            Value::String(self.url_matcher.value().to_string()),
        );

        if !self.body_patterns.is_empty() {
            let patterns = self.body_patterns.iter().map(ParamMatcher::to_value).collect();
            request.insert("bodyPatterns".to_string(), Value::Array(patterns));
        }
        if let Some(headers) = named_matchers(&self.headers) {
            request.insert("headers".to_string(), headers);
        }
        if let Some(cookies) = named_matchers(&self.cookies) {
            request.insert("cookies".to_string(), cookies);
        }
        if let Some(params) = named_matchers(&self.query_params) {
            request.insert("queryParameters".to_string(), params);
        }

        Value::Object(request)
    }
}

/// `{name: {tag: value}}`, or `None` when there is nothing to constrain.
fn named_matchers(matchers: &BTreeMap<String, ParamMatcher>) -> Option<Value> {
    if matchers.is_empty() {
        return None;
    }
    let object = matchers
        .iter()
        .map(|(name, matcher)| (name.clone(), matcher.to_value()))
        .collect();
    Some(Value::Object(object))
}

impl Serialize for RequestSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// The canned response returned when the stub fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSpec {
    body: String,
    headers: BTreeMap<String, String>,
    status: u16,
}

impl Default for ResponseSpec {
    fn default() -> Self {
        Self {
            body: String::new(),
            headers: BTreeMap::new(),
            status: 200,
        }
    }
}

impl ResponseSpec {
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    fn to_value(&self) -> Value {
        let mut response = Map::new();
        if !self.body.is_empty() {
            response.insert("body".to_string(), Value::String(self.body.clone()));
        }
        if !self.headers.is_empty() {
            let headers = self
                .headers
                .iter()
                .map(|(name, value)| (name.clone(), Value::String(value.clone())))
                .collect();
            response.insert("headers".to_string(), Value::Object(headers));
        }
        response.insert("status".to_string(), Value::from(self.status));
        Value::Object(response)
    }
}

/// A request-to-response mapping for a WireMock server.
///
/// The method and URL matcher are fixed at construction. Every other
/// field is optional and set through the chained `with_*`, `will_*`,
/// `in_*` and `when_*` calls. Unset optional fields are left out of the
/// document entirely, so `at_priority(0)` and "no priority" stay distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubRule {
    request: RequestSpec,
    response: ResponseSpec,
    priority: Option<i32>,
    scenario_name: Option<String>,
    required_scenario_state: Option<String>,
    new_scenario_state: Option<String>,
}

impl StubRule {
    /// Create a stub for `method` requests whose URL satisfies `url_matcher`.
    ///
    /// The response starts as an empty `200`.
    pub fn new(method: Method, url_matcher: UrlMatcher) -> Self {
        Self {
            request: RequestSpec::new(method, url_matcher),
            response: ResponseSpec::default(),
            priority: None,
            scenario_name: None,
            required_scenario_state: None,
            new_scenario_state: None,
        }
    }

    pub fn get(url_matcher: UrlMatcher) -> Self {
        Self::new(Method::Get, url_matcher)
    }

    pub fn post(url_matcher: UrlMatcher) -> Self {
        Self::new(Method::Post, url_matcher)
    }

    pub fn put(url_matcher: UrlMatcher) -> Self {
        Self::new(Method::Put, url_matcher)
    }

    pub fn delete(url_matcher: UrlMatcher) -> Self {
        Self::new(Method::Delete, url_matcher)
    }

    pub fn patch(url_matcher: UrlMatcher) -> Self {
        Self::new(Method::Patch, url_matcher)
    }

    pub fn head(url_matcher: UrlMatcher) -> Self {
        Self::new(Method::Head, url_matcher)
    }

    pub fn options(url_matcher: UrlMatcher) -> Self {
        Self::new(Method::Options, url_matcher)
    }

    /// Matches requests of every method.
    pub fn any(url_matcher: UrlMatcher) -> Self {
        Self::new(Method::Any, url_matcher)
    }

    /// Constrain a query parameter. A second call for the same name replaces the first.
    pub fn with_query_param(mut self, name: impl Into<String>, matcher: ParamMatcher) -> Self {
        self.request.query_params.insert(name.into(), matcher);
        self
    }

    /// Constrain a request header. A second call for the same name replaces the first.
    pub fn with_header(mut self, name: impl Into<String>, matcher: ParamMatcher) -> Self {
        self.request.headers.insert(name.into(), matcher);
        self
    }

    /// Constrain a cookie. A second call for the same name replaces the first.
    pub fn with_cookie(mut self, name: impl Into<String>, matcher: ParamMatcher) -> Self {
        self.request.cookies.insert(name.into(), matcher);
        self
    }

    /// Add a body constraint. All patterns must hold; repeats are kept as given.
    pub fn with_body_pattern(mut self, matcher: ParamMatcher) -> Self {
        self.request.body_patterns.push(matcher);
        self
    }

    /// Replace the whole response.
    ///
    /// `headers` is any iterator of name/value pairs, such as an array of
    /// tuples or a map. For a response without headers use
    /// [`will_return_body`](Self::will_return_body).
    pub fn will_return<K, V>(
        mut self,
        body: impl Into<String>,
        headers: impl IntoIterator<Item = (K, V)>,
        status: u16,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.response = ResponseSpec {
            body: body.into(),
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
            status,
        };
        self
    }

    /// Replace the whole response with `body` and `status`, and no headers.
    pub fn will_return_body(self, body: impl Into<String>, status: u16) -> Self {
        self.will_return(body, std::iter::empty::<(String, String)>(), status)
    }

    /// Lower values are matched first by the server.
    pub fn at_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn in_scenario(mut self, scenario_name: impl Into<String>) -> Self {
        self.scenario_name = Some(scenario_name.into());
        self
    }

    /// Only fire while the scenario is in `state`.
    pub fn when_scenario_state_is(mut self, state: impl Into<String>) -> Self {
        self.required_scenario_state = Some(state.into());
        self
    }

    /// Move the scenario to `state` once this stub fires.
    pub fn will_set_state_to(mut self, state: impl Into<String>) -> Self {
        self.new_scenario_state = Some(state.into());
        self
    }

    pub fn method(&self) -> Method {
        self.request.method
    }

    pub fn url_matcher(&self) -> &UrlMatcher {
        &self.request.url_matcher
    }

    pub fn request(&self) -> &RequestSpec {
        &self.request
    }

    pub fn response(&self) -> &ResponseSpec {
        &self.response
    }

    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    pub fn scenario_name(&self) -> Option<&str> {
        self.scenario_name.as_deref()
    }

    pub fn required_scenario_state(&self) -> Option<&str> {
        self.required_scenario_state.as_deref()
    }

    pub fn new_scenario_state(&self) -> Option<&str> {
        self.new_scenario_state.as_deref()
    }

    /// Flatten the rule into the mapping document tree.
    pub fn to_value(&self) -> Value {
        let mut mapping = Map::new();
        if let Some(priority) = self.priority {
            mapping.insert("priority".to_string(), Value::from(priority));
        }
        if let Some(name) = &self.scenario_name {
            mapping.insert("scenarioName".to_string(), Value::String(name.clone()));
        }
        if let Some(state) = &self.required_scenario_state {
            mapping.insert(
                "requiredScenarioState".to_string(),
                Value::String(state.clone()),
            );
        }
        if let Some(state) = &self.new_scenario_state {
            mapping.insert("newScenarioState".to_string(), Value::String(state.clone()));
        }
        mapping.insert("request".to_string(), self.request.to_value());
        mapping.insert("response".to_string(), self.response.to_value());
        Value::Object(mapping)
    }

    /// Encode the mapping as compact JSON.
    pub fn to_json(&self) -> Result<String> {
        let json = serde_json::to_string(&self.to_value())?;
        debug!(
            method = %self.request.method,
            url = self.request.url_matcher.value(),
            bytes = json.len(),
            "Encoded stub mapping"
        );
        Ok(json)
    }

    /// Encode the mapping as indented JSON, the layout of WireMock mapping files.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }
}

impl Serialize for StubRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_omitted() {
        let rule = StubRule::get(url_equal_to("/hello"));
        assert_eq!(
            rule.to_value(),
            json!({
                "request": {"method": "GET", "url": "/hello"},
                "response": {"status": 200}
            })
        );
    }

    #[test]
    fn test_post_with_header_and_response() {
        let rule = StubRule::post(url_equal_to("/things"))
            .with_header("X-Key", equal_to("abc"))
            .will_return(
                "{}",
                HashMap::from([("Content-Type".to_string(), "application/json".to_string())]),
                201,
            );

        assert_eq!(
            rule.to_value(),
            json!({
                "request": {
                    "method": "POST",
                    "url": "/things",
                    "headers": {"X-Key": {"equalTo": "abc"}}
                },
                "response": {
                    "body": "{}",
                    "headers": {"Content-Type": "application/json"},
                    "status": 201
                }
            })
        );
    }

    #[test]
    fn test_url_key_follows_strategy() {
        let cases = [
            (url_equal_to("/a"), "url"),
            (url_path_equal_to("/a"), "urlPath"),
            (url_path_matching("/a/.*"), "urlPathPattern"),
            (url_matching("/a.*"), "urlPattern"),
        ];

        for (matcher, key) in cases {
            let value = matcher.value().to_string();
            let doc = StubRule::get(matcher).to_value();
            let request = doc["request"].as_object().unwrap();
            assert_eq!(request.len(), 2);
            assert_eq!(request[key], json!(value));
        }
    }

    #[test]
    fn test_header_last_write_wins() {
        let rule = StubRule::get(url_path_equal_to("/"))
            .with_header("Accept", equal_to("text/plain"))
            .with_header("Accept", contains("json"));

        assert_eq!(rule.request().headers().len(), 1);
        assert_eq!(
            rule.to_value()["request"]["headers"],
            json!({"Accept": {"contains": "json"}})
        );
    }

    #[test]
    fn test_cookie_and_query_mappings_are_separate() {
        let rule = StubRule::get(url_path_equal_to("/search"))
            .with_query_param("q", equal_to("rust"))
            .with_query_param("q", matching("ru.*"))
            .with_cookie("q", not_matching("^$"))
            .with_cookie("session", matching("s-[0-9]+"));

        let request = rule.to_value()["request"].clone();
        assert_eq!(request["queryParameters"], json!({"q": {"matches": "ru.*"}}));
        assert_eq!(
            request["cookies"],
            json!({
                "q": {"doesNotMatch": "^$"},
                "session": {"matches": "s-[0-9]+"}
            })
        );
        assert!(request.get("headers").is_none());
    }

    #[test]
    fn test_body_patterns_keep_order_and_duplicates() {
        let rule = StubRule::put(url_equal_to("/doc"))
            .with_body_pattern(matching_json_path("$.id"))
            .with_body_pattern(contains("name"))
            .with_body_pattern(matching_json_path("$.id"));

        assert_eq!(
            rule.to_value()["request"]["bodyPatterns"],
            json!([
                {"matchesJsonPath": "$.id"},
                {"contains": "name"},
                {"matchesJsonPath": "$.id"}
            ])
        );
    }

    #[test]
    fn test_absent_strategy_passes_value_through() {
        let rule = StubRule::get(url_equal_to("/"))
            .with_header("Authorization", ParamMatcher::new(ParamMatchingStrategy::Absent, "true"));

        assert_eq!(
            rule.to_value()["request"]["headers"],
            json!({"Authorization": {"absent": "true"}})
        );
    }

    #[test]
    fn test_zero_priority_is_emitted() {
        let doc = StubRule::get(url_equal_to("/")).at_priority(0).to_value();
        assert_eq!(doc["priority"], json!(0));

        let doc = StubRule::get(url_equal_to("/")).to_value();
        assert!(doc.get("priority").is_none());
    }

    #[test]
    fn test_scenario_fields() {
        let rule = StubRule::get(url_equal_to("/todo"))
            .in_scenario("flow")
            .when_scenario_state_is(SCENARIO_STATE_STARTED)
            .will_set_state_to("next");

        assert_eq!(SCENARIO_STATE_STARTED, "Started");
        let doc = rule.to_value();
        assert_eq!(doc["scenarioName"], json!("flow"));
        assert_eq!(doc["requiredScenarioState"], json!("Started"));
        assert_eq!(doc["newScenarioState"], json!("next"));
    }

    #[test]
    fn test_will_return_replaces_response() {
        let rule = StubRule::get(url_equal_to("/"))
            .will_return("first", [("X-One", "1")], 500)
            .will_return("", HashMap::<String, String>::new(), 204);

        assert_eq!(rule.response().status(), 204);
        assert_eq!(rule.to_value()["response"], json!({"status": 204}));
    }

    #[test]
    fn test_will_return_body_clears_headers() {
        let rule = StubRule::get(url_equal_to("/"))
            .will_return("old", [("X-One", "1")], 500)
            .will_return_body("new", 202);

        assert!(rule.response().headers().is_empty());
        assert_eq!(
            rule.to_value()["response"],
            json!({"body": "new", "status": 202})
        );
    }

    #[test]
    fn test_to_json_matches_tree() {
        let rule = StubRule::delete(url_path_matching("/items/[0-9]+"))
            .at_priority(3)
            .will_return_body("gone", 410);

        let parsed: Value = serde_json::from_str(&rule.to_json().unwrap()).unwrap();
        assert_eq!(parsed, rule.to_value());

        let pretty: Value = serde_json::from_str(&rule.to_json_pretty().unwrap()).unwrap();
        assert_eq!(pretty, rule.to_value());

        // Serialize delegates to the same tree
        assert_eq!(serde_json::to_value(&rule).unwrap(), rule.to_value());
    }

    #[test]
    fn test_request_spec_standalone() {
        let rule = StubRule::patch(url_equal_to("/x")).with_header("A", equal_to("b"));
        assert_eq!(
            serde_json::to_value(rule.request()).unwrap(),
            json!({"method": "PATCH", "url": "/x", "headers": {"A": {"equalTo": "b"}}})
        );
    }

    #[test]
    fn test_method_constructors() {
        let cases = [
            (StubRule::get(url_equal_to("/")), "GET"),
            (StubRule::post(url_equal_to("/")), "POST"),
            (StubRule::put(url_equal_to("/")), "PUT"),
            (StubRule::delete(url_equal_to("/")), "DELETE"),
            (StubRule::patch(url_equal_to("/")), "PATCH"),
            (StubRule::head(url_equal_to("/")), "HEAD"),
            (StubRule::options(url_equal_to("/")), "OPTIONS"),
            (StubRule::any(url_equal_to("/")), "ANY"),
        ];

        for (rule, method) in cases {
            assert_eq!(rule.method().as_str(), method);
            assert_eq!(rule.to_value()["request"]["method"], json!(method));
        }
    }

    #[test]
    fn test_parse_method() {
        assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("Any".parse::<Method>().unwrap(), Method::Any);
        assert_eq!(serde_json::from_str::<Method>("\"delete\"").unwrap(), Method::Delete);
        assert_eq!(serde_json::to_value(Method::Delete).unwrap(), json!("DELETE"));
        assert!(matches!(
            "FETCH".parse::<Method>(),
            Err(StubError::UnknownMethod(m)) if m == "FETCH"
        ));
    }
}
