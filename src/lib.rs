//! WireMock Stub Builder
//!
//! Builds stub mappings for a WireMock server and encodes them as the JSON
//! documents its admin API accepts. Nothing here talks to the network:
//! send the document with any HTTP client.
//!
//! # Features
//!
//! - **URL Matching**: `url`, `urlPath`, `urlPathPattern`, `urlPattern`
//! - **Parameter Matching**: headers, cookies, query params and body patterns
//! - **Canned Responses**: status, headers and body
//! - **Scenarios**: priority and scenario state transitions
//! - **Stub Files**: declarative YAML stubs exported as mapping files
//!
//! # Example
//!
//! ```
//! use wiremock_stub::{equal_to, url_path_equal_to, StubRule, SCENARIO_STATE_STARTED};
//!
//! let rule = StubRule::get(url_path_equal_to("/todo"))
//!     .with_query_param("page", equal_to("1"))
//!     .will_return("[]", [("Content-Type", "application/json")], 200)
//!     .in_scenario("todo-list")
//!     .when_scenario_state_is(SCENARIO_STATE_STARTED);
//!
//! let doc = rule.to_value();
//! assert_eq!(doc["request"]["urlPath"], "/todo");
//! assert_eq!(doc["requiredScenarioState"], "Started");
//! ```
//!
//! # Example Stub File
//!
//! ```yaml
//! stubs:
//!   - id: hello-world
//!     method: GET
//!     url:
//!       urlPath: /hello
//!     response:
//!       status: 200
//!       body: "Hello, World!"
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod matching;
pub mod stub;

pub use config::StubFileConfig;
pub use error::StubError;
pub use matching::{
    contains, equal_to, equal_to_json, equal_to_xml, matching, matching_json_path,
    matching_xpath, not_matching, url_equal_to, url_matching, url_path_equal_to,
    url_path_matching, ParamMatcher, ParamMatchingStrategy, UrlMatcher, UrlMatchingStrategy,
};
pub use stub::{Method, RequestSpec, ResponseSpec, StubRule, SCENARIO_STATE_STARTED};
