//! Version manifest.
//!
//! The manifest pins the versions of external artifacts (toolchains, SDKs)
//! that the build program expects:
//!
//! ```toml
//! [artifacts]
//! vs2022-toolchain = "14.34.31933"
//! win10sdk = "10.0.19041.0"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::error::PlanError;
use crate::core::version::ToolVersion;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionManifest {
    #[serde(default)]
    artifacts: BTreeMap<String, String>,
}

impl VersionManifest {
    /// Load a manifest from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read version manifest: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse version manifest: {}", path.display()))
    }

    /// Record a version for an artifact.
    pub fn insert(&mut self, artifact: impl Into<String>, version: impl Into<String>) {
        self.artifacts.insert(artifact.into(), version.into());
    }

    /// Raw version string of an artifact.
    pub fn version_of(&self, artifact: &str) -> Result<&str, PlanError> {
        self.artifacts
            .get(artifact)
            .map(String::as_str)
            .ok_or_else(|| PlanError::ArtifactNotInManifest {
                artifact: artifact.to_string(),
            })
    }

    /// Toolchain version of an artifact, using toolchain artifact naming.
    pub fn toolchain_version(&self, artifact: &str) -> Result<ToolVersion, PlanError> {
        ToolVersion::from_toolchain_artifact(artifact, self.version_of(artifact)?)
    }

    /// Plain dotted version of an artifact.
    pub fn sdk_version(&self, artifact: &str) -> Result<ToolVersion, PlanError> {
        let raw = self.version_of(artifact)?;
        raw.parse().map_err(|_| PlanError::InvalidVersion {
            artifact: artifact.to_string(),
            version: raw.to_string(),
        })
    }
}
