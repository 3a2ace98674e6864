//! Stub file configuration.
//!
//! Declarative YAML stub definitions that turn into [`StubRule`]s.

use crate::export::is_valid_mapping_id;
use crate::matching::{ParamMatcher, ParamMatchingStrategy, UrlMatcher, UrlMatchingStrategy};
use crate::stub::{Method, StubRule};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// A stub file: a list of stub definitions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct StubFileConfig {
    /// List of stub definitions
    #[serde(default)]
    pub stubs: Vec<StubDefinition>,
}

impl StubFileConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        info!(path = %path.display(), stubs = config.stubs.len(), "Loaded stub file");
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for (i, stub) in self.stubs.iter().enumerate() {
            stub.validate()
                .map_err(|e| anyhow::anyhow!("Stub {}: {}", i, e))?;
            if !seen.insert(stub.id.as_str()) {
                anyhow::bail!("Stub {}: duplicate id '{}'", i, stub.id);
            }
        }
        Ok(())
    }

    /// Build a rule for every definition, keyed by stub id.
    pub fn into_rules(self) -> anyhow::Result<Vec<(String, StubRule)>> {
        self.stubs
            .into_iter()
            .map(|stub| {
                let rule = stub.to_rule()?;
                Ok((stub.id, rule))
            })
            .collect()
    }
}

/// A single stub definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StubDefinition {
    /// Unique identifier, also the mapping file name
    pub id: String,

    /// HTTP method
    pub method: Method,

    /// URL matcher, e.g. `{ urlPath: /things }`
    pub url: BTreeMap<UrlMatchingStrategy, String>,

    /// Priority (lower = matched first)
    #[serde(default)]
    pub priority: Option<i32>,

    /// Scenario state machine fields
    #[serde(default)]
    pub scenario: Option<ScenarioDefinition>,

    /// Request constraints beyond method and URL
    #[serde(default)]
    pub request: RequestDefinition,

    /// Response to return
    #[serde(default)]
    pub response: ResponseDefinition,
}

impl StubDefinition {
    /// Validate the stub definition.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.id.is_empty() {
            anyhow::bail!("Stub id cannot be empty");
        }
        if !is_valid_mapping_id(&self.id) {
            anyhow::bail!("Stub id '{}' must be a plain file name", self.id);
        }
        single_entry(&self.url).map_err(|e| anyhow::anyhow!("url: {}", e))?;
        self.request.validate()?;
        self.response.validate()?;
        Ok(())
    }

    /// Build the equivalent [`StubRule`].
    pub fn to_rule(&self) -> anyhow::Result<StubRule> {
        let (strategy, value) = single_entry(&self.url)?;
        let mut rule = StubRule::new(self.method, UrlMatcher::new(strategy, value));

        for (name, matcher) in &self.request.headers {
            rule = rule.with_header(name, param_matcher(matcher)?);
        }
        for (name, matcher) in &self.request.cookies {
            rule = rule.with_cookie(name, param_matcher(matcher)?);
        }
        for (name, matcher) in &self.request.query {
            rule = rule.with_query_param(name, param_matcher(matcher)?);
        }
        for matcher in &self.request.body_patterns {
            rule = rule.with_body_pattern(param_matcher(matcher)?);
        }

        rule = rule.will_return(
            self.response.body.as_str(),
            &self.response.headers,
            self.response.status,
        );

        if let Some(priority) = self.priority {
            rule = rule.at_priority(priority);
        }
        if let Some(scenario) = &self.scenario {
            rule = rule.in_scenario(&scenario.name);
            if let Some(state) = &scenario.required_state {
                rule = rule.when_scenario_state_is(state);
            }
            if let Some(state) = &scenario.new_state {
                rule = rule.will_set_state_to(state);
            }
        }

        debug!(id = %self.id, method = %self.method, "Built stub rule");
        Ok(rule)
    }
}

/// A matcher written as `{ <strategy>: <value> }`.
pub type MatcherDefinition = BTreeMap<ParamMatchingStrategy, String>;

fn param_matcher(definition: &MatcherDefinition) -> anyhow::Result<ParamMatcher> {
    let (strategy, value) = single_entry(definition)?;
    Ok(ParamMatcher::new(strategy, value))
}

fn single_entry<K: Copy>(map: &BTreeMap<K, String>) -> anyhow::Result<(K, &str)> {
    let mut entries = map.iter();
    match (entries.next(), entries.next()) {
        (Some((key, value)), None) => Ok((*key, value.as_str())),
        (None, _) => anyhow::bail!("matcher must have exactly one strategy, found none"),
        (Some(_), Some(_)) => anyhow::bail!(
            "matcher must have exactly one strategy, found {}",
            map.len()
        ),
    }
}

/// Scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioDefinition {
    /// Scenario name
    pub name: String,

    /// State the scenario must be in for the stub to fire
    #[serde(default)]
    pub required_state: Option<String>,

    /// State to move to after the stub fires
    #[serde(default)]
    pub new_state: Option<String>,
}

/// Request matching configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RequestDefinition {
    /// Header matching
    #[serde(default)]
    pub headers: BTreeMap<String, MatcherDefinition>,

    /// Cookie matching
    #[serde(default)]
    pub cookies: BTreeMap<String, MatcherDefinition>,

    /// Query parameter matching
    #[serde(default)]
    pub query: BTreeMap<String, MatcherDefinition>,

    /// Body matching, all patterns must hold
    #[serde(default)]
    pub body_patterns: Vec<MatcherDefinition>,
}

impl RequestDefinition {
    /// Validate the request definition.
    pub fn validate(&self) -> anyhow::Result<()> {
        let named = [
            ("header", &self.headers),
            ("cookie", &self.cookies),
            ("query", &self.query),
        ];
        for (kind, matchers) in named {
            for (name, matcher) in matchers {
                single_entry(matcher).map_err(|e| anyhow::anyhow!("{} '{}': {}", kind, name, e))?;
            }
        }
        for (i, matcher) in self.body_patterns.iter().enumerate() {
            single_entry(matcher).map_err(|e| anyhow::anyhow!("body pattern {}: {}", i, e))?;
        }
        Ok(())
    }
}

/// Response definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResponseDefinition {
    /// HTTP status code
    #[serde(default = "default_status")]
    pub status: u16,

    /// Response headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Response body
    #[serde(default)]
    pub body: String,
}

fn default_status() -> u16 {
    200
}

impl Default for ResponseDefinition {
    fn default() -> Self {
        Self {
            status: default_status(),
            headers: BTreeMap::new(),
            body: String::new(),
        }
    }
}

impl ResponseDefinition {
    /// Validate the response definition.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.status < 100 || self.status > 599 {
            anyhow::bail!("Invalid status code: {}", self.status);
        }
        Ok(())
    }
}
