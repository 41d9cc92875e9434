//! Core model for consumer-driven contract testing.
//!
//! Provides:
//! - The `Matcher` tree and diff engine for structural JSON matching
//! - Interaction types (request patterns, response templates, provider states)
//! - The durable contract artifact exchanged between consumer and provider suites
//! - The shared error taxonomy

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod artifact;
pub mod error;
pub mod interaction;
pub mod matcher;

pub use artifact::{ArtifactMetadata, ContractArtifact, Participant, SpecVersion};
pub use error::ContractError;
pub use interaction::{
    Interaction, ProviderState, RequestPattern, RequestSnapshot, ResponseTemplate,
};
pub use matcher::{Matcher, Mismatch, ShapeBuilder};
