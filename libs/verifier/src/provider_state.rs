//! Provider-state setup hook.
//!
//! The provider test harness supplies the implementation; the verifier only
//! invokes it by name before replaying an interaction that declares a state.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Error returned by a failing provider-state setup.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StateSetupError(String);

impl StateSetupError {
    /// Create a setup error with the given reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Hook invoked to place the provider into a named state before an
/// interaction is replayed.
#[async_trait]
pub trait ProviderStateHandler: Send + Sync {
    /// Set up the named state. A failure marks the interaction as failed but
    /// does not abort the verification run.
    async fn setup(
        &self,
        name: &str,
        params: &BTreeMap<String, Value>,
    ) -> Result<(), StateSetupError>;
}

/// Handler that accepts every state without doing anything. Useful when the
/// provider needs no setup, or states are prepared out of band.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStateHandler;

#[async_trait]
impl ProviderStateHandler for NoopStateHandler {
    async fn setup(
        &self,
        _name: &str,
        _params: &BTreeMap<String, Value>,
    ) -> Result<(), StateSetupError> {
        Ok(())
    }
}
