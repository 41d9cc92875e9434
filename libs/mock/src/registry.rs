//! Ordered registry of declared interactions.
//!
//! The registry is mutated only during test setup. Once the mock endpoint
//! starts serving, the server holds an `Arc` snapshot and treats it as
//! read-only; hit bookkeeping lives in the server, not here.

use contract_core::matcher::Mismatch;
use contract_core::{ContractError, Interaction, RequestSnapshot};

/// In-memory ordered collection of declared interactions, scoped to a single
/// test session.
#[derive(Debug, Default)]
pub struct InteractionRegistry {
    interactions: Vec<Interaction>,
}

impl InteractionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an interaction.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::AmbiguousInteraction`] when the new
    /// interaction's request pattern overlaps with one already registered.
    /// Overlap is detected by cross-checking canonical example requests: if
    /// either pattern accepts the other's example, first-match-wins lookup
    /// could silently shadow one of them, so registration fails fast instead.
    pub fn register(&mut self, interaction: Interaction) -> Result<(), ContractError> {
        if let Some(existing) = self
            .interactions
            .iter()
            .find(|existing| Self::overlaps(existing, &interaction))
        {
            return Err(ContractError::AmbiguousInteraction {
                first: existing.description.clone(),
                second: interaction.description,
            });
        }
        self.interactions.push(interaction);
        Ok(())
    }

    /// Find the first registered interaction whose request pattern is
    /// satisfied by the request, in registration order.
    #[must_use]
    pub fn find_match(&self, request: &RequestSnapshot) -> Option<(usize, &Interaction)> {
        self.interactions
            .iter()
            .enumerate()
            .find(|(_, interaction)| interaction.request.matches(request))
    }

    /// Diff the request against every registered interaction, closest
    /// candidates (fewest mismatches) first. Used for the diagnostic failure
    /// response when nothing matches.
    #[must_use]
    pub fn candidates(&self, request: &RequestSnapshot) -> Vec<(&Interaction, Vec<Mismatch>)> {
        let mut out: Vec<_> = self
            .interactions
            .iter()
            .map(|interaction| (interaction, interaction.request.diff(request)))
            .collect();
        out.sort_by_key(|(_, mismatches)| mismatches.len());
        out
    }

    /// Registered interactions in registration order.
    #[must_use]
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Number of registered interactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Clear all interactions. Each independent test case should start from
    /// an empty registry; this exists for harnesses that reuse one.
    pub fn reset(&mut self) {
        self.interactions.clear();
    }

    fn overlaps(a: &Interaction, b: &Interaction) -> bool {
        a.request.matches(&b.request.example_snapshot())
            || b.request.matches(&a.request.example_snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contract_core::interaction::{RequestPattern, ResponseTemplate};
    use contract_core::matcher::Matcher;
    use std::collections::BTreeMap;

    fn interaction(description: &str, method: &str, path: &str) -> Interaction {
        Interaction {
            description: description.to_string(),
            provider_state: None,
            request: RequestPattern {
                method: method.to_string(),
                path: Matcher::literal(path),
                headers: BTreeMap::new(),
                body: None,
            },
            response: ResponseTemplate {
                status: 200,
                headers: BTreeMap::new(),
                body: None,
            },
        }
    }

    fn snapshot(method: &str, path: &str) -> RequestSnapshot {
        RequestSnapshot {
            method: method.to_string(),
            path: path.to_string(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    #[test]
    fn test_first_match_wins_in_registration_order() {
        let mut registry = InteractionRegistry::new();
        registry.register(interaction("get job", "GET", "/job")).unwrap();
        registry
            .register(interaction("get products", "GET", "/products"))
            .unwrap();

        let (index, matched) = registry.find_match(&snapshot("GET", "/products")).unwrap();
        assert_eq!(index, 1);
        assert_eq!(matched.description, "get products");
        assert!(registry.find_match(&snapshot("DELETE", "/job")).is_none());
    }

    #[test]
    fn test_overlapping_registration_fails_fast() {
        let mut registry = InteractionRegistry::new();
        registry.register(interaction("get job", "GET", "/job")).unwrap();

        let mut overlapping = interaction("get any", "GET", "/ignored");
        overlapping.request.path = Matcher::regex("/.*", "/job");

        let err = registry.register(overlapping).unwrap_err();
        assert!(matches!(
            err,
            ContractError::AmbiguousInteraction { ref first, .. } if first == "get job"
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_candidates_sorted_by_closeness() {
        let mut registry = InteractionRegistry::new();
        registry
            .register(interaction("get products", "POST", "/products"))
            .unwrap();
        registry.register(interaction("get job", "GET", "/job")).unwrap();

        let candidates = registry.candidates(&snapshot("GET", "/jobs"));
        assert_eq!(candidates.len(), 2);
        // "get job" differs only in path, "get products" in method and path
        assert_eq!(candidates[0].0.description, "get job");
        assert_eq!(candidates[0].1.len(), 1);
    }

    #[test]
    fn test_reset_clears_registrations() {
        let mut registry = InteractionRegistry::new();
        registry.register(interaction("get job", "GET", "/job")).unwrap();
        registry.reset();
        assert!(registry.is_empty());
    }
}
