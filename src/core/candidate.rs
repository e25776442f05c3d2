//! Toolchain/SDK candidates.
//!
//! A candidate is one concrete toolchain installation (or downloadable
//! option) with known versions and origin. Candidates are enumerated once
//! from the catalog and never mutated afterwards.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::platform::{Architecture, Platform};
use crate::core::version::ToolVersion;

/// Where a candidate comes from.
///
/// Declaration order is the preference order: local installs rank before
/// downloadable ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Local,
    Downloadable,
}

impl Origin {
    /// Short tag used in diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            Origin::Local => "local",
            Origin::Downloadable => "online",
        }
    }
}

/// Visual Studio toolchain plus Windows SDK.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisualStudioLayout {
    /// Directories containing `cl.exe`, `link.exe` and SDK tools
    #[serde(default)]
    pub bin_paths: Vec<PathBuf>,
    /// Directories for the `INCLUDE` environment variable
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,
    /// Directories for the `LIB` environment variable
    #[serde(default)]
    pub library_paths: Vec<PathBuf>,
}

/// Xcode command line tools plus a macOS SDK.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MacLayout {
    pub bin_path: PathBuf,
    pub sysroot: PathBuf,
}

/// Clang with a pinned sysroot and GCC toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinuxClangLayout {
    pub sysroot: PathBuf,
    pub gcc_toolchain: PathBuf,
    pub tools_path: PathBuf,
    #[serde(default = "default_linux_triple")]
    pub target_triple: String,
}

fn default_linux_triple() -> String {
    "x86_64-glibc2.17-linux-gnu".to_string()
}

/// Filesystem layout of a candidate, one variant per platform family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum SdkLayout {
    Windows(VisualStudioLayout),
    #[serde(alias = "macos")]
    Mac(MacLayout),
    Linux(LinuxClangLayout),
}

impl SdkLayout {
    /// The platform family this layout belongs to.
    pub fn platform(&self) -> Platform {
        match self {
            SdkLayout::Windows(_) => Platform::Windows,
            SdkLayout::Mac(_) => Platform::Mac,
            SdkLayout::Linux(_) => Platform::Linux,
        }
    }

    /// Short toolchain name for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SdkLayout::Windows(_) => "visual-studio",
            SdkLayout::Mac(_) => "xcode-clang",
            SdkLayout::Linux(_) => "linux-clang",
        }
    }

    /// An inert layout whose paths do not exist on any machine.
    fn placeholder(platform: Platform) -> Self {
        let missing = PathBuf::from(PLACEHOLDER_ROOT);
        match platform {
            Platform::Windows => SdkLayout::Windows(VisualStudioLayout {
                bin_paths: vec![missing.join("bin")],
                include_paths: vec![missing.join("include")],
                library_paths: vec![missing.join("lib")],
            }),
            Platform::Mac => SdkLayout::Mac(MacLayout {
                bin_path: missing.join("bin"),
                sysroot: missing.join("sysroot"),
            }),
            Platform::Linux => SdkLayout::Linux(LinuxClangLayout {
                sysroot: missing.join("sysroot"),
                gcc_toolchain: missing.join("gcc"),
                tools_path: missing.join("bin"),
                target_triple: default_linux_triple(),
            }),
        }
    }
}

/// Root of every placeholder path.
pub const PLACEHOLDER_ROOT: &str = "no-toolchain-available";

/// One concrete toolchain installation or downloadable option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Identity within its locator
    pub id: String,
    /// Toolset version (e.g. MSVC 14.34.31933, Clang 14.0)
    pub version: ToolVersion,
    /// Companion platform SDK version (e.g. Win10 SDK 10.0.19041.0)
    pub secondary: Option<ToolVersion>,
    pub platform: Platform,
    pub arch: Architecture,
    pub origin: Origin,
    pub layout: SdkLayout,
    /// Set only on the inert stand-in produced when nothing matched
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub placeholder: bool,
}

impl Candidate {
    /// Build the inert stand-in returned when no candidate is usable.
    ///
    /// It carries a well-formed layout so graph construction proceeds; the
    /// external driver fails when it tries to use the missing paths.
    pub fn placeholder(platform: Platform, arch: Architecture) -> Self {
        Candidate {
            id: "dummy".to_string(),
            version: ToolVersion::new(0, 0),
            secondary: None,
            platform,
            arch,
            origin: Origin::Local,
            layout: SdkLayout::placeholder(platform),
            placeholder: true,
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.id, self.version, self.origin.tag())?;
        if let Some(secondary) = self.secondary {
            write!(f, " sdk {}", secondary)?;
        }
        Ok(())
    }
}
