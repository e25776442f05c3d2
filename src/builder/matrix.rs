//! Build matrix expansion.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::PlanError;
use crate::core::platform::{Architecture, Platform};

/// Build variant of a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildVariant {
    Debug,
    Release,
}

impl BuildVariant {
    pub const ALL: [BuildVariant; 2] = [BuildVariant::Debug, BuildVariant::Release];

    /// Value of the driver's `cfg=` argument.
    pub fn cfg_name(&self) -> &'static str {
        match self {
            BuildVariant::Debug => "debug",
            BuildVariant::Release => "release",
        }
    }

    /// Name suffix; only debug builds carry one.
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            BuildVariant::Debug => Some("dbg"),
            BuildVariant::Release => None,
        }
    }
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cfg_name())
    }
}

/// Identifies one pipeline instance.
///
/// Keys are validated on construction; an unsupported platform/architecture
/// combination never becomes a key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ConfigurationKey {
    platform: Platform,
    arch: Architecture,
    variant: BuildVariant,
    #[serde(skip)]
    arch_token: &'static str,
}

impl ConfigurationKey {
    pub fn new(
        platform: Platform,
        arch: Architecture,
        variant: BuildVariant,
    ) -> Result<Self, PlanError> {
        let arch_token = arch.driver_name()?;
        if platform == Platform::Linux && arch != Architecture::X64 {
            return Err(PlanError::unsupported_arch(arch, "linux clang toolchains"));
        }

        Ok(ConfigurationKey {
            platform,
            arch,
            variant,
            arch_token,
        })
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn arch(&self) -> Architecture {
        self.arch
    }

    pub fn variant(&self) -> BuildVariant {
        self.variant
    }

    /// Driver architecture token (`intel64`, `arm64`).
    pub fn arch_token(&self) -> &'static str {
        self.arch_token
    }

    /// Configuration id, e.g. `linux_intel64` or `windows_arm64_dbg`.
    ///
    /// Names the install directory and the aggregate targets.
    pub fn config_id(&self) -> String {
        let mut id = format!("{}_{}", self.platform.display_name(), self.arch_token);
        if let Some(suffix) = self.variant.suffix() {
            id.push('_');
            id.push_str(suffix);
        }
        id
    }

    /// Archive file stem, e.g. `tbb-linux_intel64` or `tbb-macos_arm64-dbg`.
    pub fn archive_stem(&self, component: &str) -> String {
        let mut stem = format!(
            "{}-{}_{}",
            component,
            self.platform.display_name(),
            self.arch_token
        );
        if let Some(suffix) = self.variant.suffix() {
            stem.push('-');
            stem.push_str(suffix);
        }
        stem
    }
}

impl fmt::Display for ConfigurationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} {}", self.platform, self.arch, self.variant)
    }
}

/// Cross every target pair with every build variant.
///
/// Fails on the first unsupported pair instead of skipping it.
pub fn expand(targets: &[(Platform, Architecture)]) -> Result<Vec<ConfigurationKey>, PlanError> {
    let mut keys = Vec::with_capacity(targets.len() * BuildVariant::ALL.len());
    for &(platform, arch) in targets {
        for variant in BuildVariant::ALL {
            keys.push(ConfigurationKey::new(platform, arch, variant)?);
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_host_matrix() {
        let keys = expand(&Platform::Mac.host_targets()).unwrap();
        assert_eq!(keys.len(), 4);
        assert_eq!(keys[0].to_string(), "macos-x64 debug");
        assert_eq!(keys[3].config_id(), "macos_arm64");
    }

    #[test]
    fn test_expand_rejects_unsupported() {
        let err = expand(&[(Platform::Linux, Architecture::Arm64)]).unwrap_err();
        assert!(err.to_string().contains("unsupported architecture `arm64`"));

        let err = expand(&[(Platform::Windows, Architecture::X86)]).unwrap_err();
        assert!(matches!(err, PlanError::UnsupportedArchitecture { .. }));
    }

    #[test]
    fn test_names() {
        let release =
            ConfigurationKey::new(Platform::Linux, Architecture::X64, BuildVariant::Release)
                .unwrap();
        assert_eq!(release.config_id(), "linux_intel64");
        assert_eq!(release.archive_stem("tbb"), "tbb-linux_intel64");

        let debug =
            ConfigurationKey::new(Platform::Windows, Architecture::Arm64, BuildVariant::Debug)
                .unwrap();
        assert_eq!(debug.config_id(), "windows_arm64_dbg");
        assert_eq!(debug.archive_stem("tbb"), "tbb-windows_arm64-dbg");
    }
}
