//! Toolchain and SDK version numbers.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::error::PlanError;

/// Toolchain artifact versions look like `14.34.31933` or `14.36.a1b2c3`:
/// a five digit build number, or a six character content hash that carries
/// no build information.
static TOOLCHAIN_ARTIFACT_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?<major>\d+)\.(?<minor>\d+)\.(?:(?<build>\d{5})|(?<hash>[a-e0-9]{6}))$")
        .expect("toolchain version pattern is valid")
});

/// Toolsets whose sub-minor releases are mutually incompatible. When the
/// manifest names one of these without a build number, the build is pinned.
const PINNED_BUILDS: &[(u32, u32, u32)] = &[(14, 28, 29333)];

/// A dotted version with two to four numeric components.
///
/// Missing trailing components order before any present value, so `14.3`
/// sorts below `14.3.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToolVersion {
    pub major: u32,
    pub minor: u32,
    pub build: Option<u32>,
    pub revision: Option<u32>,
}

impl ToolVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        ToolVersion {
            major,
            minor,
            build: None,
            revision: None,
        }
    }

    pub fn with_build(mut self, build: u32) -> Self {
        self.build = Some(build);
        self
    }

    pub fn with_revision(mut self, revision: u32) -> Self {
        self.revision = Some(revision);
        self
    }

    /// Parse a toolchain version as recorded in the version manifest.
    ///
    /// A five digit build component becomes an explicit build requirement;
    /// a hash suffix leaves the build unspecified.
    pub fn from_toolchain_artifact(artifact: &str, s: &str) -> Result<Self, PlanError> {
        let invalid = || PlanError::InvalidVersion {
            artifact: artifact.to_string(),
            version: s.to_string(),
        };

        let caps = TOOLCHAIN_ARTIFACT_VERSION.captures(s).ok_or_else(invalid)?;
        let major = caps["major"].parse().map_err(|_| invalid())?;
        let minor = caps["minor"].parse().map_err(|_| invalid())?;

        let mut version = ToolVersion::new(major, minor);
        match caps.name("build") {
            Some(build) => version.build = Some(build.as_str().parse().map_err(|_| invalid())?),
            None => {
                version.build = PINNED_BUILDS
                    .iter()
                    .find(|(ma, mi, _)| *ma == major && *mi == minor)
                    .map(|(_, _, build)| *build);
            }
        }

        Ok(version)
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{}", build)?;
            if let Some(revision) = self.revision {
                write!(f, ".{}", revision)?;
            }
        }
        Ok(())
    }
}

impl FromStr for ToolVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .trim()
            .split('.')
            .map(|p| p.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid version `{}`: {}", s, e))?;

        match parts.as_slice() {
            [major, minor] => Ok(ToolVersion::new(*major, *minor)),
            [major, minor, build] => Ok(ToolVersion::new(*major, *minor).with_build(*build)),
            [major, minor, build, revision] => Ok(ToolVersion::new(*major, *minor)
                .with_build(*build)
                .with_revision(*revision)),
            _ => Err(format!(
                "invalid version `{}`: expected 2 to 4 numeric components",
                s
            )),
        }
    }
}

impl TryFrom<String> for ToolVersion {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ToolVersion> for String {
    fn from(value: ToolVersion) -> Self {
        value.to_string()
    }
}
