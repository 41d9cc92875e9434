//! Shared error taxonomy for the contract harness.
//!
//! Consumer-side errors (`UnregisteredInteraction`, `UnexercisedInteraction`,
//! `AmbiguousInteraction`) are fatal to the enclosing test run. Provider-side
//! failures (`ProviderStateSetupFailure`, `NetworkFailure`) are collected per
//! interaction by the verifier and never abort a verification run.

use thiserror::Error;

/// Error type shared across the contract testing harness.
#[derive(Debug, Error)]
pub enum ContractError {
    /// Expected and actual shapes diverge at a specific path.
    #[error("matcher mismatch at {path}: expected {expected}, got {actual}")]
    MatcherMismatch {
        /// Path into the JSON document where the mismatch occurred
        path: String,
        /// Description of the expected shape
        expected: String,
        /// Description of the actual value
        actual: String,
    },

    /// An incoming request matched no registered interaction.
    #[error("no matching interaction for {method} {path}")]
    UnregisteredInteraction {
        /// HTTP method of the stray request
        method: String,
        /// Path of the stray request
        path: String,
    },

    /// An interaction was declared but never invoked during the test run.
    #[error("interaction '{0}' was declared but never invoked")]
    UnexercisedInteraction(String),

    /// Two registered interactions accept the same request.
    #[error("interaction '{second}' overlaps with already registered interaction '{first}'")]
    AmbiguousInteraction {
        /// Description of the interaction registered first
        first: String,
        /// Description of the interaction whose registration failed
        second: String,
    },

    /// An interaction declaration is incomplete or inconsistent.
    #[error("invalid interaction: {0}")]
    InvalidInteraction(String),

    /// A provider state setup hook failed (verifier side).
    #[error("provider state setup '{state}' failed: {reason}")]
    ProviderStateSetupFailure {
        /// Name of the provider state
        state: String,
        /// Cause reported by the setup hook
        reason: String,
    },

    /// A replayed request could not reach the provider (verifier side).
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The mock listener could not be started or torn down.
    #[error("mock server error: {0}")]
    MockServer(String),

    /// I/O error while reading or writing a contract artifact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error while encoding or decoding JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ContractError::UnexercisedInteraction("get job".to_string());
        assert_eq!(
            err.to_string(),
            "interaction 'get job' was declared but never invoked"
        );

        let err = ContractError::AmbiguousInteraction {
            first: "get job".to_string(),
            second: "get job again".to_string(),
        };
        assert!(err.to_string().contains("overlaps"));
    }
}
