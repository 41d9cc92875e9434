//! Proptest generators for matcher trees and HTTP shapes.

use contract_core::Matcher;
use proptest::collection::btree_map;
use proptest::prelude::*;
use serde_json::Value;

/// Generate scalar JSON values (no objects or arrays). Bare objects decode as
/// shapes and bare arrays as whole-array literals, so scalar literals are the
/// representative case for round-trip properties.
pub fn scalar_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 _.-]{0,20}".prop_map(Value::String),
    ]
}

/// Generate regex pattern/example pairs where the example satisfies the
/// pattern, so generated matchers validate their own canonical examples.
pub fn regex_pair_strategy() -> impl Strategy<Value = (String, String)> {
    prop_oneof![
        Just(("[0-9]{11}".to_string(), "07456978900".to_string())),
        Just((
            "-?[0-9]{1,2}\\.[0-9]+".to_string(),
            "53.35612531404332".to_string()
        )),
        Just(("[A-Z_]+".to_string(), "CREDIT_CARD".to_string())),
        Just(("CC_[0-9]{3}".to_string(), "CC_001".to_string())),
        Just(("v[0-9]+".to_string(), "v1".to_string())),
    ]
}

/// Generate leaf matchers (literal, type, regex).
pub fn leaf_matcher_strategy() -> impl Strategy<Value = Matcher> {
    prop_oneof![
        scalar_value_strategy().prop_map(Matcher::Literal),
        scalar_value_strategy()
            .prop_filter("type matchers need a non-null example", |v| !v.is_null())
            .prop_map(|example| Matcher::Type { example }),
        regex_pair_strategy().prop_map(|(pattern, example)| Matcher::regex(pattern, example)),
    ]
}

/// Generate whole matcher trees: leaves composed through object shapes and
/// array-minimum matchers, up to a small depth.
pub fn matcher_strategy() -> impl Strategy<Value = Matcher> {
    leaf_matcher_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (0usize..4, inner.clone())
                .prop_map(|(min, template)| Matcher::array_min(min, template)),
            btree_map("[a-zA-Z][a-zA-Z0-9]{0,10}", inner, 1..4).prop_map(Matcher::Object),
        ]
    })
}

/// Generate matcher trees suitable for body positions. A whole-body null
/// literal canonicalizes to "no body" in the artifact format, so body
/// round-trip properties must not draw it.
pub fn body_matcher_strategy() -> impl Strategy<Value = Matcher> {
    matcher_strategy().prop_filter("null-literal bodies are canonically absent", |matcher| {
        !matcher.is_null_literal()
    })
}

/// Generate HTTP methods.
pub fn http_method_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("GET".to_string()),
        Just("POST".to_string()),
        Just("PUT".to_string()),
        Just("DELETE".to_string()),
        Just("PATCH".to_string()),
    ]
}

/// Generate request paths.
pub fn path_strategy() -> impl Strategy<Value = String> {
    "/[a-z][a-z0-9/-]{2,30}"
}
