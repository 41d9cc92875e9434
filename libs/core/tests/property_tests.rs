//! Property-based tests for the matcher engine and contract artifact.
//!
//! Tests validate:
//! - Matcher wire-format round-trip (no loss of matcher type information)
//! - Canonical examples satisfy their own matchers
//! - Artifact serialization round-trip

use contract_core::interaction::{RequestPattern, ResponseTemplate};
use contract_core::{ContractArtifact, Interaction, Matcher, Participant};
use contract_test_utils::{
    body_matcher_strategy, http_method_strategy, matcher_strategy, path_strategy,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any generated matcher tree, encoding to the artifact wire format
    /// and decoding back produces an identical tree.
    #[test]
    fn prop_matcher_wire_roundtrip(matcher in matcher_strategy()) {
        let wire = serde_json::to_string(&matcher).unwrap();
        let decoded: Matcher = serde_json::from_str(&wire).unwrap();
        prop_assert_eq!(matcher, decoded,
            "matcher should survive wire roundtrip without losing type information");
    }

    /// For any generated matcher tree, the canonical example it produces
    /// satisfies the matcher itself. This is what makes mock responses
    /// self-consistent: served bodies always re-validate.
    #[test]
    fn prop_example_satisfies_own_matcher(matcher in matcher_strategy()) {
        let example = matcher.example();
        let diff = matcher.diff(&example);
        prop_assert!(diff.is_empty(),
            "canonical example should satisfy its own matcher, got {diff:?}");
    }

    /// Examples are deterministic: two derivations are identical.
    #[test]
    fn prop_example_is_deterministic(matcher in matcher_strategy()) {
        prop_assert_eq!(matcher.example(), matcher.example());
    }

    /// For any generated interaction, an artifact holding it round-trips
    /// through serialization unchanged. Null-literal bodies are excluded:
    /// in body position they canonicalize to "no body".
    #[test]
    fn prop_artifact_roundtrip(
        method in http_method_strategy(),
        path in path_strategy(),
        body in body_matcher_strategy(),
    ) {
        let artifact = ContractArtifact::new(
            Participant::new("SamirsApp"),
            Participant::new("JobService"),
            vec![Interaction {
                description: "generated interaction".to_string(),
                provider_state: None,
                request: RequestPattern {
                    method,
                    path: Matcher::literal(path),
                    headers: BTreeMap::new(),
                    body: None,
                },
                response: ResponseTemplate {
                    status: 200,
                    headers: BTreeMap::new(),
                    body: Some(body),
                },
            }],
        );

        let json = serde_json::to_string(&artifact).unwrap();
        let restored: ContractArtifact = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(artifact, restored);
    }
}
