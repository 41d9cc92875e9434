//! Interaction model: request patterns, response templates and provider
//! states.

use crate::matcher::{Matcher, Mismatch};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A named precondition the provider must be placed into before an
/// interaction is replayed, optionally carrying parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderState {
    /// Name of the state, e.g. `a job exists`
    pub name: String,
    /// State parameters, e.g. `{"id": 10}`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Value>,
}

impl ProviderState {
    /// Create a provider state without parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter to the state.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// The request half of an interaction: matchers describing the HTTP calls the
/// consumer test is expected to make.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPattern {
    /// HTTP method, compared case-insensitively
    pub method: String,
    /// Path matcher, typically a literal
    pub path: Matcher,
    /// Header matchers, keyed by lowercase header name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Matcher>,
    /// Body matcher, absent when no body is expected
    #[serde(default, skip_serializing_if = "body_is_absent")]
    pub body: Option<Matcher>,
}

/// A null-literal body carries no matcher information; the wire format treats
/// it the same as no body, so it is never emitted. Deserializing an explicit
/// `"body": null` likewise yields `None`, keeping write/load lossless.
fn body_is_absent(body: &Option<Matcher>) -> bool {
    body.as_ref().is_none_or(Matcher::is_null_literal)
}

/// A concrete incoming or replayed HTTP request, snapshotted for matching.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    /// HTTP method
    pub method: String,
    /// Request path including any query string
    pub path: String,
    /// Headers with lowercase names
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON body, if any
    pub body: Option<Value>,
}

impl RequestPattern {
    /// Diff a concrete request against this pattern. An empty result means
    /// the request satisfies the pattern.
    #[must_use]
    pub fn diff(&self, actual: &RequestSnapshot) -> Vec<Mismatch> {
        let mut out = Vec::new();

        if !self.method.eq_ignore_ascii_case(&actual.method) {
            out.push(Mismatch {
                path: "method".to_string(),
                expected: self.method.clone(),
                actual: actual.method.clone(),
            });
        }

        for mismatch in self.path.diff(&Value::String(actual.path.clone())) {
            out.push(Mismatch {
                path: format!("path{}", mismatch.path.trim_start_matches('$')),
                ..mismatch
            });
        }

        for (name, matcher) in &self.headers {
            match actual.headers.get(&name.to_ascii_lowercase()) {
                Some(value) => {
                    for mismatch in matcher.diff(&Value::String(value.clone())) {
                        out.push(Mismatch {
                            path: format!("header[{name}]"),
                            ..mismatch
                        });
                    }
                }
                None => out.push(Mismatch {
                    path: format!("header[{name}]"),
                    expected: "header to be present".to_string(),
                    actual: "missing".to_string(),
                }),
            }
        }

        if let Some(body_matcher) = &self.body {
            match &actual.body {
                Some(body) => out.extend(body_matcher.diff(body)),
                None => out.push(Mismatch {
                    path: "$".to_string(),
                    expected: "request body".to_string(),
                    actual: "no body".to_string(),
                }),
            }
        }

        out
    }

    /// Whether a concrete request satisfies this pattern.
    #[must_use]
    pub fn matches(&self, actual: &RequestSnapshot) -> bool {
        self.diff(actual).is_empty()
    }

    /// The literal path derived from the path matcher's example.
    #[must_use]
    pub fn example_path(&self) -> String {
        match self.path.example() {
            Value::String(path) => path,
            other => other.to_string(),
        }
    }

    /// Literal headers derived from the header matchers' examples.
    #[must_use]
    pub fn example_headers(&self) -> BTreeMap<String, String> {
        self.headers
            .iter()
            .map(|(name, matcher)| {
                let value = match matcher.example() {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                (name.clone(), value)
            })
            .collect()
    }

    /// Literal body derived from the body matcher's example.
    #[must_use]
    pub fn example_body(&self) -> Option<Value> {
        self.body.as_ref().map(Matcher::example)
    }

    /// A concrete request this pattern is satisfied by, used for ambiguity
    /// detection and provider-side replay.
    #[must_use]
    pub fn example_snapshot(&self) -> RequestSnapshot {
        RequestSnapshot {
            method: self.method.clone(),
            path: self.example_path(),
            headers: self
                .example_headers()
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value))
                .collect(),
            body: self.example_body(),
        }
    }
}

/// The response half of an interaction: a canned status, literal headers and
/// a body template whose fields may carry their own matchers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTemplate {
    /// HTTP status code
    pub status: u16,
    /// Literal response headers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Body template
    #[serde(default, skip_serializing_if = "body_is_absent")]
    pub body: Option<Matcher>,
}

impl ResponseTemplate {
    /// Literal body served by the mock endpoint, derived from the body
    /// matcher's canonical example.
    #[must_use]
    pub fn example_body(&self) -> Option<Value> {
        self.body.as_ref().map(Matcher::example)
    }
}

/// One declared request/response pair with matchers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    /// Human-readable description, unique within a contract
    pub description: String,
    /// Optional provider-side precondition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_state: Option<ProviderState>,
    /// Expected request
    pub request: RequestPattern,
    /// Canned response
    pub response: ResponseTemplate,
}
