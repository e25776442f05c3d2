//! Target platforms and architectures.
//!
//! Platforms form a closed set: every mapping from a platform to a driver
//! value is an exhaustive `match`, so adding a family without handling it
//! fails to compile instead of falling through at runtime.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::PlanError;

/// Platform family a configuration targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "windows")]
    Windows,
    #[serde(rename = "macos", alias = "mac", alias = "osx")]
    Mac,
    #[serde(rename = "linux")]
    Linux,
}

impl Platform {
    /// All supported platform families.
    pub const ALL: [Platform; 3] = [Platform::Windows, Platform::Mac, Platform::Linux];

    /// Detect the platform of the machine running the plan.
    pub fn host() -> Result<Self, PlanError> {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a Rust `target_os` value to a platform family.
    pub fn from_os(os: &str) -> Result<Self, PlanError> {
        match os {
            "windows" => Ok(Platform::Windows),
            "macos" => Ok(Platform::Mac),
            "linux" => Ok(Platform::Linux),
            other => Err(PlanError::unsupported_platform(other, "host detection")),
        }
    }

    /// Lowercase name used in configuration ids and archive names.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Mac => "macos",
            Platform::Linux => "linux",
        }
    }

    /// Canonical system name written into package descriptors.
    pub fn system_name(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::Mac => "Darwin",
            Platform::Linux => "Linux",
        }
    }

    /// Whether this family uses the POSIX install layout (no `bin/`).
    pub fn is_posix(&self) -> bool {
        match self {
            Platform::Windows => false,
            Platform::Mac | Platform::Linux => true,
        }
    }

    /// The (platform, architecture) pairs built when planning on this host.
    pub fn host_targets(&self) -> Vec<(Platform, Architecture)> {
        match self {
            Platform::Windows => vec![
                (Platform::Windows, Architecture::X64),
                (Platform::Windows, Architecture::Arm64),
            ],
            Platform::Linux => vec![(Platform::Linux, Architecture::X64)],
            Platform::Mac => vec![
                (Platform::Mac, Architecture::X64),
                (Platform::Mac, Architecture::Arm64),
            ],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Platform {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win" => Ok(Platform::Windows),
            "macos" | "mac" | "osx" | "darwin" => Ok(Platform::Mac),
            "linux" => Ok(Platform::Linux),
            _ => Err(PlanError::unsupported_platform(s, "platform name")),
        }
    }
}

/// CPU architecture of a configuration or candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    X86,
    X64,
    Arm64,
}

impl Architecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
            Architecture::Arm64 => "arm64",
        }
    }

    /// Architecture token understood by the external build driver.
    ///
    /// This token also names the architecture in configuration ids and
    /// archive names.
    pub fn driver_name(&self) -> Result<&'static str, PlanError> {
        match self {
            Architecture::X64 => Ok("intel64"),
            Architecture::Arm64 => Ok("arm64"),
            Architecture::X86 => Err(PlanError::unsupported_arch(self, "build driver")),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x86" | "i686" => Ok(Architecture::X86),
            "x64" | "x86_64" | "amd64" | "intel64" => Ok(Architecture::X64),
            "arm64" | "aarch64" => Ok(Architecture::Arm64),
            _ => Err(PlanError::unsupported_arch(s, "architecture name")),
        }
    }
}
