use super::RoutingPlan;
use crate::error::ArtifactError;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

/// Bumped whenever the binary layout of [`RoutingPlan`] changes.
pub const PLAN_FORMAT_VERSION: u16 = 1;

/// A routing plan wrapped with its binary format version, as handed to the engine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlanArtifact {
    pub format_version: u16,
    pub plan: RoutingPlan,
}

impl PlanArtifact {
    pub fn new(plan: RoutingPlan) -> Self {
        Self {
            format_version: PLAN_FORMAT_VERSION,
            plan,
        }
    }

    /// Encodes the artifact with bincode's standard configuration.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        encode_to_vec(self, standard())
            .map_err(|e| ArtifactError::Generic(format!("Serialization failed: {}", e)))
    }

    /// Decodes an artifact, refusing formats this build does not understand.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let artifact: PlanArtifact = decode_from_slice(bytes, standard())
            .map(|(artifact, _)| artifact) // bincode 2 returns (data, bytes_read)
            .map_err(|e| ArtifactError::Generic(format!("Deserialization failed: {}", e)))?;
        if artifact.format_version != PLAN_FORMAT_VERSION {
            return Err(ArtifactError::Generic(format!(
                "Unsupported plan format version {} (expected {})",
                artifact.format_version, PLAN_FORMAT_VERSION
            )));
        }
        Ok(artifact)
    }

    /// Saves the artifact to a file, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ArtifactError::Generic(format!(
                    "Could not create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        let mut file = fs::File::create(path).map_err(|e| {
            ArtifactError::Generic(format!("Could not create file '{}': {}", path.display(), e))
        })?;
        file.write_all(&bytes).map_err(|e| {
            ArtifactError::Generic(format!("Could not write to file '{}': {}", path.display(), e))
        })?;
        Ok(())
    }

    /// Loads an artifact from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let mut file = fs::File::open(path).map_err(|e| {
            ArtifactError::Generic(format!("Could not open file '{}': {}", path.display(), e))
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| {
            ArtifactError::Generic(format!("Could not read from file '{}': {}", path.display(), e))
        })?;
        Self::from_bytes(&bytes)
    }
}
