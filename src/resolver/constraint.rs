//! Version constraints on toolchain candidates.

use std::fmt;

use serde::Serialize;

use crate::core::candidate::Candidate;
use crate::core::error::PlanError;
use crate::core::manifest::VersionManifest;
use crate::core::platform::Platform;
use crate::core::version::ToolVersion;
use crate::util::config::Config;

/// A partial version requirement.
///
/// Each component is optional and an absent component never excludes a
/// candidate. The toolset build number is asymmetric: a build in the
/// constraint must match exactly, while a constraint without a build
/// accepts any build of the same major.minor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Constraint {
    /// Required toolset major.minor, plus build when specified
    pub toolset: Option<ToolVersion>,
    /// Required companion SDK version, compared exactly
    pub secondary: Option<ToolVersion>,
}

impl Constraint {
    /// A constraint every candidate satisfies.
    pub fn any() -> Self {
        Constraint::default()
    }

    pub fn toolset(version: ToolVersion) -> Self {
        Constraint {
            toolset: Some(version),
            secondary: None,
        }
    }

    pub fn with_secondary(mut self, version: ToolVersion) -> Self {
        self.secondary = Some(version);
        self
    }

    pub fn is_any(&self) -> bool {
        self.toolset.is_none() && self.secondary.is_none()
    }

    /// Whether a candidate satisfies this constraint.
    pub fn matches(&self, candidate: &Candidate) -> bool {
        if let Some(secondary) = self.secondary {
            if candidate.secondary != Some(secondary) {
                return false;
            }
        }

        if let Some(toolset) = self.toolset {
            let version = &candidate.version;
            if version.major != toolset.major || version.minor != toolset.minor {
                return false;
            }
            if toolset.build.is_some() && version.build != toolset.build {
                return false;
            }
        }

        true
    }

    /// Derive the constraint a platform family resolves with.
    ///
    /// Manifest entries are looked up here, before any candidate is
    /// filtered, so a missing entry fails fast.
    pub fn for_platform(
        platform: Platform,
        config: &Config,
        manifest: &VersionManifest,
    ) -> Result<Self, PlanError> {
        match platform {
            Platform::Windows => {
                let toolset = manifest.toolchain_version(&config.windows.toolset_artifact)?;
                let sdk = manifest.sdk_version(&config.windows.sdk_artifact)?;
                Ok(Constraint::toolset(toolset).with_secondary(sdk))
            }
            Platform::Mac => Ok(Constraint::toolset(config.mac.sdk_version)),
            Platform::Linux => Ok(Constraint::any()),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.toolset, self.secondary) {
            (None, None) => write!(f, "any version"),
            (Some(toolset), None) => write!(f, "toolset version {}", toolset),
            (None, Some(secondary)) => write!(f, "SDK version {}", secondary),
            (Some(toolset), Some(secondary)) => {
                write!(f, "toolset version {} and SDK version {}", toolset, secondary)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::candidate::Origin;
    use crate::test_support::{linux_candidate, windows_candidate};

    #[test]
    fn test_any_matches_everything() {
        let c = linux_candidate("clang", "14.0", Origin::Local);
        assert!(Constraint::any().matches(&c));
        assert!(Constraint::any().is_any());
    }

    #[test]
    fn test_unspecified_build_is_wildcard() {
        let constraint = Constraint::toolset(ToolVersion::new(14, 34));
        let a = windows_candidate("a", "14.34.31933", "10.0.19041.0", Origin::Local);
        let b = windows_candidate("b", "14.34.31937", "10.0.19041.0", Origin::Local);
        let c = windows_candidate("c", "14.35.32215", "10.0.19041.0", Origin::Local);

        assert!(constraint.matches(&a));
        assert!(constraint.matches(&b));
        assert!(!constraint.matches(&c));
    }

    #[test]
    fn test_specified_build_is_exact() {
        let constraint = Constraint::toolset(ToolVersion::new(14, 34).with_build(31933));
        let a = windows_candidate("a", "14.34.31933", "10.0.19041.0", Origin::Local);
        let b = windows_candidate("b", "14.34.31937", "10.0.19041.0", Origin::Local);

        assert!(constraint.matches(&a));
        assert!(!constraint.matches(&b));
    }

    #[test]
    fn test_secondary_is_exact() {
        let constraint = Constraint::any().with_secondary("10.0.19041.0".parse().unwrap());
        let a = windows_candidate("a", "14.34.31933", "10.0.19041.0", Origin::Local);
        let b = windows_candidate("b", "14.34.31933", "10.0.22621.0", Origin::Local);
        let none = linux_candidate("clang", "14.0", Origin::Local);

        assert!(constraint.matches(&a));
        assert!(!constraint.matches(&b));
        assert!(!constraint.matches(&none));
    }

    #[test]
    fn test_for_platform() {
        let config = Config::default();
        let mut manifest = VersionManifest::default();

        let err = Constraint::for_platform(Platform::Windows, &config, &manifest).unwrap_err();
        assert!(matches!(err, PlanError::ArtifactNotInManifest { .. }));

        manifest.insert("vs2022-toolchain", "14.34.31933");
        manifest.insert("win10sdk", "10.0.19041.0");
        let windows = Constraint::for_platform(Platform::Windows, &config, &manifest).unwrap();
        assert_eq!(windows.toolset.unwrap().build, Some(31933));
        assert_eq!(windows.secondary.unwrap().to_string(), "10.0.19041.0");

        let mac = Constraint::for_platform(Platform::Mac, &config, &manifest).unwrap();
        assert_eq!(mac, Constraint::toolset(ToolVersion::new(11, 1)));

        let linux = Constraint::for_platform(Platform::Linux, &config, &manifest).unwrap();
        assert!(linux.is_any());
    }

    #[test]
    fn test_display() {
        let constraint = Constraint::toolset(ToolVersion::new(14, 34))
            .with_secondary("10.0.19041.0".parse().unwrap());
        assert_eq!(
            constraint.to_string(),
            "toolset version 14.34 and SDK version 10.0.19041.0"
        );
        assert_eq!(Constraint::any().to_string(), "any version");
    }
}
