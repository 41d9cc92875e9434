//! Contract artifact: the durable record exchanged between consumer and
//! provider test suites.
//!
//! Artifacts are written once at the end of a successful consumer run and
//! consumed read-only by provider verification runs. Serialization is
//! deterministic apart from the generation timestamp: field order is fixed
//! and all maps are sorted.

use crate::error::ContractError;
use crate::interaction::Interaction;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Contract specification version written into artifact metadata.
pub const SPEC_VERSION: &str = "3.0.0";

/// A participant in a contract (consumer or provider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Participant name
    pub name: String,
}

impl Participant {
    /// Create a new participant.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Contract specification version tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecVersion {
    /// Version string
    pub version: String,
}

/// Artifact metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Contract specification version
    #[serde(rename = "contractSpecification")]
    pub contract_specification: SpecVersion,
    /// Generation timestamp (RFC 3339); the only non-deterministic field
    #[serde(rename = "generatedAt")]
    pub generated_at: String,
}

impl Default for ArtifactMetadata {
    fn default() -> Self {
        Self {
            contract_specification: SpecVersion {
                version: SPEC_VERSION.to_string(),
            },
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// The persisted, portable record of verified interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractArtifact {
    /// Consumer participant
    pub consumer: Participant,
    /// Provider participant
    pub provider: Participant,
    /// Verified interactions, in declaration order
    pub interactions: Vec<Interaction>,
    /// Artifact metadata
    pub metadata: ArtifactMetadata,
}

impl ContractArtifact {
    /// Create an artifact from verified interactions.
    #[must_use]
    pub fn new(
        consumer: Participant,
        provider: Participant,
        interactions: Vec<Interaction>,
    ) -> Self {
        Self {
            consumer,
            provider,
            interactions,
            metadata: ArtifactMetadata::default(),
        }
    }

    /// Conventional file name for this artifact: `<consumer>-<provider>.json`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}-{}.json", self.consumer.name, self.provider.name)
    }

    /// Write the artifact into a directory, creating it if necessary.
    /// Returns the path of the written file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file cannot
    /// be written.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ContractError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        let mut contents = serde_json::to_string_pretty(self)?;
        contents.push('\n');
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Load an artifact from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not contain a
    /// valid artifact.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContractError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
