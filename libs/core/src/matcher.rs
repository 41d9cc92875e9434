//! Matcher engine: recursive structural matching over JSON values.
//!
//! A matcher tree mirrors the shape of the JSON document it validates. Leaves
//! are literal, type or regex matchers; interior nodes are object shapes and
//! array-minimum matchers. A single recursive diff walk produces either an
//! empty mismatch list (match) or a list of per-path diagnostics.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Wire key that distinguishes a matcher wrapper object from a plain shape.
const MATCHER_KEY: &str = "matcher";

/// A node in a matcher tree.
///
/// On the wire (inside a contract artifact), literals serialize as their raw
/// JSON value, non-literal leaves serialize as `{"matcher": ..., ...}` wrapper
/// objects, and object shapes serialize as plain JSON objects whose values are
/// themselves serialized matchers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Value", try_from = "Value")]
pub enum Matcher {
    /// Actual value must equal the expected value exactly.
    Literal(Value),
    /// Actual value must have the same JSON type as the example; the value
    /// itself is ignored. Null never satisfies a type matcher.
    Type {
        /// Example value defining the expected type and the canonical example
        example: Value,
    },
    /// Actual value must be a string fully matching the pattern.
    Regex {
        /// Regular expression, implicitly anchored at both ends
        pattern: String,
        /// Canonical example, expected to satisfy the pattern
        example: String,
    },
    /// Actual value must be an array of at least `min` elements, each
    /// satisfying the template.
    ArrayMin {
        /// Minimum number of elements
        min: usize,
        /// Matcher applied to every element
        template: Box<Matcher>,
    },
    /// Actual value must be an object where every declared key satisfies its
    /// matcher. Undeclared keys are ignored unless strict mode is requested.
    Object(BTreeMap<String, Matcher>),
}

/// A single diagnostic entry produced by [`Matcher::diff`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    /// Path into the JSON document, e.g. `$.customer.firstName`
    pub path: String,
    /// Description of the expected shape
    pub expected: String,
    /// Description of the actual value
    pub actual: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.path, self.expected, self.actual
        )
    }
}

/// Error produced when decoding a matcher from its wire form.
#[derive(Debug, Error)]
#[error("invalid matcher: {0}")]
pub struct MatcherParseError(String);

impl Matcher {
    /// Literal equality matcher.
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Type matcher with an arbitrary example value.
    #[must_use]
    pub fn type_of(example: impl Into<Value>) -> Self {
        Self::Type {
            example: example.into(),
        }
    }

    /// Type matcher for a string field.
    #[must_use]
    pub fn string_type(example: impl Into<String>) -> Self {
        Self::Type {
            example: Value::String(example.into()),
        }
    }

    /// Type matcher for an integer field.
    #[must_use]
    pub fn integer_type(example: i64) -> Self {
        Self::Type {
            example: Value::from(example),
        }
    }

    /// Type matcher for a boolean field.
    #[must_use]
    pub fn boolean_type(example: bool) -> Self {
        Self::Type {
            example: Value::Bool(example),
        }
    }

    /// Regex matcher. The pattern is validated when the matcher is decoded
    /// from an artifact; an uncompilable pattern never matches and is reported
    /// as a mismatch.
    #[must_use]
    pub fn regex(pattern: impl Into<String>, example: impl Into<String>) -> Self {
        Self::Regex {
            pattern: pattern.into(),
            example: example.into(),
        }
    }

    /// Array matcher requiring at least `min` elements, each satisfying the
    /// template.
    #[must_use]
    pub fn array_min(min: usize, template: Matcher) -> Self {
        Self::ArrayMin {
            min,
            template: Box::new(template),
        }
    }

    /// Start building an object shape matcher.
    #[must_use]
    pub fn shape() -> ShapeBuilder {
        ShapeBuilder::default()
    }

    /// Whether this matcher is a literal `null`. In body position a null
    /// literal is canonically the same as no body at all.
    #[must_use]
    pub fn is_null_literal(&self) -> bool {
        matches!(self, Self::Literal(Value::Null))
    }

    /// Check whether the actual value satisfies this matcher.
    #[must_use]
    pub fn matches(&self, actual: &Value) -> bool {
        self.diff(actual).is_empty()
    }

    /// Diff the actual value against this matcher with open-world object
    /// semantics: keys present in the actual document but not declared in the
    /// matcher are ignored.
    #[must_use]
    pub fn diff(&self, actual: &Value) -> Vec<Mismatch> {
        let mut out = Vec::new();
        self.diff_at("$", actual, false, &mut out);
        out
    }

    /// Diff with closed-world object semantics: undeclared keys in the actual
    /// document are reported as mismatches.
    #[must_use]
    pub fn diff_strict(&self, actual: &Value) -> Vec<Mismatch> {
        let mut out = Vec::new();
        self.diff_at("$", actual, true, &mut out);
        out
    }

    /// Produce the canonical example value for this matcher. The example is
    /// deterministic, so repeated mock responses and verifier replays are
    /// stable across runs.
    #[must_use]
    pub fn example(&self) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Type { example } => example.clone(),
            Self::Regex { example, .. } => Value::String(example.clone()),
            Self::ArrayMin { min, template } => {
                Value::Array((0..*min).map(|_| template.example()).collect())
            }
            Self::Object(fields) => {
                let map: Map<String, Value> = fields
                    .iter()
                    .map(|(key, matcher)| (key.clone(), matcher.example()))
                    .collect();
                Value::Object(map)
            }
        }
    }

    fn diff_at(&self, path: &str, actual: &Value, strict: bool, out: &mut Vec<Mismatch>) {
        match self {
            Self::Literal(expected) => {
                if actual != expected {
                    out.push(Mismatch {
                        path: path.to_string(),
                        expected: format!("literal {expected}"),
                        actual: render(actual),
                    });
                }
            }
            Self::Type { example } => {
                if actual.is_null() {
                    out.push(Mismatch {
                        path: path.to_string(),
                        expected: format!("non-null {}", json_type(example)),
                        actual: "null".to_string(),
                    });
                } else if json_type(actual) != json_type(example) {
                    out.push(Mismatch {
                        path: path.to_string(),
                        expected: format!("value of type {}", json_type(example)),
                        actual: format!("{} of type {}", render(actual), json_type(actual)),
                    });
                }
            }
            Self::Regex { pattern, .. } => match actual {
                Value::String(text) => match Regex::new(&format!("^(?:{pattern})$")) {
                    Ok(re) => {
                        if !re.is_match(text) {
                            out.push(Mismatch {
                                path: path.to_string(),
                                expected: format!("string matching /{pattern}/"),
                                actual: format!("\"{text}\""),
                            });
                        }
                    }
                    Err(_) => out.push(Mismatch {
                        path: path.to_string(),
                        expected: format!("string matching /{pattern}/"),
                        actual: "pattern failed to compile".to_string(),
                    }),
                },
                other => out.push(Mismatch {
                    path: path.to_string(),
                    expected: format!("string matching /{pattern}/"),
                    actual: format!("{} of type {}", render(other), json_type(other)),
                }),
            },
            Self::ArrayMin { min, template } => match actual {
                Value::Array(elements) => {
                    if elements.len() < *min {
                        out.push(Mismatch {
                            path: path.to_string(),
                            expected: format!("array with at least {min} elements"),
                            actual: format!("array with {} elements", elements.len()),
                        });
                    }
                    for (index, element) in elements.iter().enumerate() {
                        template.diff_at(&format!("{path}[{index}]"), element, strict, out);
                    }
                }
                other => out.push(Mismatch {
                    path: path.to_string(),
                    expected: format!("array with at least {min} elements"),
                    actual: format!("{} of type {}", render(other), json_type(other)),
                }),
            },
            Self::Object(fields) => match actual {
                Value::Object(map) => {
                    for (key, matcher) in fields {
                        match map.get(key) {
                            Some(value) => {
                                matcher.diff_at(&format!("{path}.{key}"), value, strict, out);
                            }
                            None => out.push(Mismatch {
                                path: format!("{path}.{key}"),
                                expected: "key to be present".to_string(),
                                actual: "missing".to_string(),
                            }),
                        }
                    }
                    if strict {
                        for key in map.keys() {
                            if !fields.contains_key(key) {
                                out.push(Mismatch {
                                    path: format!("{path}.{key}"),
                                    expected: "no undeclared keys".to_string(),
                                    actual: "unexpected key".to_string(),
                                });
                            }
                        }
                    }
                }
                other => out.push(Mismatch {
                    path: path.to_string(),
                    expected: "object".to_string(),
                    actual: format!("{} of type {}", render(other), json_type(other)),
                }),
            },
        }
    }
}

/// Builder for [`Matcher::Object`] shapes, mirroring the nested JSON body DSL.
#[derive(Debug, Default)]
pub struct ShapeBuilder {
    fields: BTreeMap<String, Matcher>,
}

impl ShapeBuilder {
    /// Declare a field and its matcher.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, matcher: Matcher) -> Self {
        self.fields.insert(name.into(), matcher);
        self
    }

    /// Finish the shape.
    #[must_use]
    pub fn build(self) -> Matcher {
        Matcher::Object(self.fields)
    }
}

/// JSON type name used in diagnostics.
fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compact rendering of an actual value for diagnostics.
fn render(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() > 80 {
        let truncated: String = text.chars().take(80).collect();
        format!("{truncated}…")
    } else {
        text
    }
}

impl From<Matcher> for Value {
    fn from(matcher: Matcher) -> Self {
        match matcher {
            Matcher::Literal(value) => value,
            Matcher::Type { example } => json!({ "matcher": "type", "example": example }),
            Matcher::Regex { pattern, example } => {
                json!({ "matcher": "regex", "pattern": pattern, "example": example })
            }
            Matcher::ArrayMin { min, template } => {
                json!({ "matcher": "arrayMin", "min": min, "template": Value::from(*template) })
            }
            Matcher::Object(fields) => {
                let map: Map<String, Value> = fields
                    .into_iter()
                    .map(|(key, matcher)| (key, Value::from(matcher)))
                    .collect();
                Value::Object(map)
            }
        }
    }
}

impl TryFrom<Value> for Matcher {
    type Error = MatcherParseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => match map.get(MATCHER_KEY).and_then(Value::as_str) {
                Some("type") => {
                    let example = map
                        .get("example")
                        .cloned()
                        .ok_or_else(|| MatcherParseError("type matcher without example".into()))?;
                    Ok(Self::Type { example })
                }
                Some("regex") => {
                    let pattern = map
                        .get("pattern")
                        .and_then(Value::as_str)
                        .ok_or_else(|| MatcherParseError("regex matcher without pattern".into()))?
                        .to_string();
                    Regex::new(&pattern)
                        .map_err(|e| MatcherParseError(format!("bad pattern /{pattern}/: {e}")))?;
                    let example = map
                        .get("example")
                        .and_then(Value::as_str)
                        .ok_or_else(|| MatcherParseError("regex matcher without example".into()))?
                        .to_string();
                    Ok(Self::Regex { pattern, example })
                }
                Some("arrayMin") => {
                    let min = map
                        .get("min")
                        .and_then(Value::as_u64)
                        .ok_or_else(|| MatcherParseError("arrayMin matcher without min".into()))?;
                    let template = map
                        .get("template")
                        .cloned()
                        .ok_or_else(|| {
                            MatcherParseError("arrayMin matcher without template".into())
                        })
                        .and_then(Self::try_from)?;
                    Ok(Self::ArrayMin {
                        min: usize::try_from(min)
                            .map_err(|_| MatcherParseError("min out of range".into()))?,
                        template: Box::new(template),
                    })
                }
                Some(other) => Err(MatcherParseError(format!("unknown matcher kind '{other}'"))),
                None => {
                    let mut fields = BTreeMap::new();
                    for (key, nested) in map {
                        fields.insert(key, Self::try_from(nested)?);
                    }
                    Ok(Self::Object(fields))
                }
            },
            other => Ok(Self::Literal(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_matches_exact_value() {
        let matcher = Matcher::literal("/job");
        assert!(matcher.matches(&json!("/job")));
        assert!(!matcher.matches(&json!("/jobs")));
    }

    #[test]
    fn test_type_matcher_ignores_value() {
        let matcher = Matcher::string_type("Prince");
        assert!(matcher.matches(&json!("Ali")));
        assert!(!matcher.matches(&json!(42)));
    }

    #[test]
    fn test_type_mismatch_records_both_types() {
        let matcher = Matcher::string_type("Prince");
        let diff = matcher.diff(&json!(42));
        assert_eq!(diff.len(), 1);
        assert!(diff[0].expected.contains("string"));
        assert!(diff[0].actual.contains("number"));
    }

    #[test]
    fn test_null_never_satisfies_type_matcher() {
        let matcher = Matcher::boolean_type(false);
        let diff = matcher.diff(&Value::Null);
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].actual, "null");
    }

    #[test]
    fn test_regex_requires_full_match() {
        let matcher = Matcher::regex("[0-9]{11}", "07456978900");
        assert!(matcher.matches(&json!("07456978900")));
        // partial match must not pass
        assert!(!matcher.matches(&json!("x07456978900y")));
        assert!(!matcher.matches(&json!(7_456_978_900_u64)));
    }

    #[test]
    fn test_array_min_validates_every_element() {
        let matcher = Matcher::array_min(
            1,
            Matcher::shape()
                .field("id", Matcher::integer_type(10))
                .build(),
        );
        assert!(matcher.matches(&json!([{ "id": 1 }, { "id": 2, "extra": true }])));
        assert!(!matcher.matches(&json!([])));

        let diff = matcher.diff(&json!([{ "id": 1 }, { "id": "two" }]));
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].path, "$[1].id");
    }

    #[test]
    fn test_object_open_world_ignores_undeclared_keys() {
        let matcher = Matcher::shape()
            .field("name", Matcher::string_type("28 Degrees"))
            .build();
        assert!(matcher.matches(&json!({ "name": "28 Degrees", "version": "v1" })));
    }

    #[test]
    fn test_object_strict_rejects_undeclared_keys() {
        let matcher = Matcher::shape()
            .field("name", Matcher::string_type("28 Degrees"))
            .build();
        let diff = matcher.diff_strict(&json!({ "name": "28 Degrees", "version": "v1" }));
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].path, "$.version");
    }

    #[test]
    fn test_missing_key_reported_with_path() {
        let matcher = Matcher::shape()
            .field(
                "customer",
                Matcher::shape()
                    .field("firstName", Matcher::string_type("Prince"))
                    .build(),
            )
            .build();
        let diff = matcher.diff(&json!({ "customer": {} }));
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].path, "$.customer.firstName");
        assert_eq!(diff[0].actual, "missing");
    }

    #[test]
    fn test_example_is_deterministic() {
        let matcher = Matcher::shape()
            .field("id", Matcher::integer_type(10))
            .field("name", Matcher::string_type("28 Degrees"))
            .build();
        assert_eq!(matcher.example(), matcher.example());
        assert_eq!(
            matcher.example(),
            json!({ "id": 10, "name": "28 Degrees" })
        );
    }

    #[test]
    fn test_example_satisfies_own_matcher() {
        let matcher = Matcher::array_min(
            2,
            Matcher::shape()
                .field("id", Matcher::integer_type(1))
                .field("type", Matcher::regex("[A-Z_]+", "CREDIT_CARD"))
                .build(),
        );
        assert!(matcher.matches(&matcher.example()));
    }

    #[test]
    fn test_wire_roundtrip_preserves_matcher_types() {
        let matcher = Matcher::shape()
            .field("id", Matcher::integer_type(10))
            .field("code", Matcher::regex("CC_[0-9]+", "CC_001"))
            .field("tags", Matcher::array_min(1, Matcher::string_type("a")))
            .field("fixed", Matcher::literal("v1"))
            .build();

        let wire = serde_json::to_string(&matcher).unwrap();
        let decoded: Matcher = serde_json::from_str(&wire).unwrap();
        assert_eq!(matcher, decoded);
    }

    #[test]
    fn test_wire_rejects_bad_regex_pattern() {
        let wire = json!({ "matcher": "regex", "pattern": "(", "example": "x" });
        let result: Result<Matcher, _> = serde_json::from_value(wire);
        assert!(result.is_err());
    }

    #[test]
    fn test_plain_object_decodes_as_shape() {
        let wire = json!({ "name": "28 Degrees" });
        let decoded: Matcher = serde_json::from_value(wire).unwrap();
        assert_eq!(
            decoded,
            Matcher::shape()
                .field("name", Matcher::literal("28 Degrees"))
                .build()
        );
    }
}
