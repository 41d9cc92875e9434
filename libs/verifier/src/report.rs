//! Per-interaction verification outcomes and the aggregated run report.

use serde::Serialize;
use std::fmt;

/// Outcome of verifying a single interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InteractionOutcome {
    /// The provider's response satisfied the declared matchers.
    Passed,
    /// State setup, the network call or the response check failed.
    Failed {
        /// Causing reason
        reason: String,
    },
    /// The interaction was never attempted (e.g. the run was cancelled).
    Skipped {
        /// Why it was skipped
        reason: String,
    },
}

impl InteractionOutcome {
    /// Whether the interaction passed.
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Whether the interaction failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for InteractionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
            Self::Skipped { reason } => write!(f, "skipped: {reason}"),
        }
    }
}

/// Result for one interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionResult {
    /// Interaction description from the artifact
    pub description: String,
    /// Outcome
    pub outcome: InteractionOutcome,
}

/// Aggregated result of a verification run.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    /// Consumer name from the artifact
    pub consumer: String,
    /// Provider name from the artifact
    pub provider: String,
    /// Per-interaction results in artifact order
    pub results: Vec<InteractionResult>,
}

impl VerificationReport {
    /// Whether the whole run passed: every interaction verified, none failed
    /// or skipped.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.results
            .iter()
            .all(|result| result.outcome.is_passed())
    }

    /// Results of interactions that did not pass.
    #[must_use]
    pub fn failures(&self) -> Vec<&InteractionResult> {
        self.results
            .iter()
            .filter(|result| !result.outcome.is_passed())
            .collect()
    }

    /// Short human-readable summary, e.g. `2 passed, 1 failed, 0 skipped`.
    #[must_use]
    pub fn summary(&self) -> String {
        let passed = self
            .results
            .iter()
            .filter(|r| r.outcome.is_passed())
            .count();
        let failed = self
            .results
            .iter()
            .filter(|r| r.outcome.is_failed())
            .count();
        let skipped = self.results.len() - passed - failed;
        format!("{passed} passed, {failed} failed, {skipped} skipped")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcomes: Vec<InteractionOutcome>) -> VerificationReport {
        VerificationReport {
            consumer: "SamirsApp".to_string(),
            provider: "JobService".to_string(),
            results: outcomes
                .into_iter()
                .enumerate()
                .map(|(i, outcome)| InteractionResult {
                    description: format!("interaction {i}"),
                    outcome,
                })
                .collect(),
        }
    }

    #[test]
    fn test_run_passes_only_when_every_interaction_passed() {
        assert!(report(vec![InteractionOutcome::Passed, InteractionOutcome::Passed]).passed());
        assert!(!report(vec![
            InteractionOutcome::Passed,
            InteractionOutcome::Failed {
                reason: "boom".to_string()
            }
        ])
        .passed());
        assert!(!report(vec![InteractionOutcome::Skipped {
            reason: "aborted".to_string()
        }])
        .passed());
    }

    #[test]
    fn test_failures_name_the_bad_interactions() {
        let report = report(vec![
            InteractionOutcome::Passed,
            InteractionOutcome::Failed {
                reason: "status 500".to_string(),
            },
        ]);
        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].description, "interaction 1");
    }

    #[test]
    fn test_summary_counts() {
        let report = report(vec![
            InteractionOutcome::Passed,
            InteractionOutcome::Failed {
                reason: "x".to_string(),
            },
            InteractionOutcome::Skipped {
                reason: "aborted".to_string(),
            },
        ]);
        assert_eq!(report.summary(), "1 passed, 1 failed, 1 skipped");
    }
}
