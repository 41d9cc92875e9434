//! Provider-side verification of contract artifacts.
//!
//! Reads a contract artifact, replays each interaction's literal request
//! against the real provider (optionally after invoking a named
//! provider-state setup hook) and diffs the actual response against the
//! declared matchers. Failures are collected per interaction and reported in
//! aggregate; they never abort the run.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod provider_state;
pub mod report;
pub mod verifier;

pub use provider_state::{NoopStateHandler, ProviderStateHandler, StateSetupError};
pub use report::{InteractionOutcome, InteractionResult, VerificationReport};
pub use verifier::{CancelFlag, Verifier};
