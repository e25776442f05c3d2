//! Test utilities for dockyard unit tests.
//!
//! Candidate builders for each platform family and a planning context with
//! a fixed manifest and host search path, so tests never depend on the
//! machine they run on.
//!
//! # Example
//!
//! ```rust,ignore
//! use dockyard::test_support::{context_with, linux_candidate};
//!
//! #[test]
//! fn test_example() {
//!     let locator = CatalogLocator::new(
//!         "tbb",
//!         Platform::Linux,
//!         Architecture::X64,
//!         vec![linux_candidate("clang", "14.0", Origin::Local)],
//!     );
//!     let ctx = context_with(Platform::Linux, vec![locator]);
//!     // Plan with ctx...
//! }
//! ```

pub mod fixtures;

use std::path::PathBuf;

use crate::core::candidate::{
    Candidate, LinuxClangLayout, MacLayout, Origin, SdkLayout, VisualStudioLayout,
};
use crate::core::catalog::{CandidateCatalog, CatalogLocator};
use crate::core::manifest::VersionManifest;
use crate::core::platform::{Architecture, Platform};
use crate::core::version::ToolVersion;
use crate::util::config::Config;
use crate::util::context::PlanningContext;

// Re-export fixtures for convenience
pub use fixtures::*;

/// Toolset pinned by [`test_manifest`].
pub const TEST_TOOLSET: &str = "14.34.31933";

/// Windows SDK pinned by [`test_manifest`].
pub const TEST_WINDOWS_SDK: &str = "10.0.19041.0";

fn version(s: &str) -> ToolVersion {
    s.parse()
        .unwrap_or_else(|e| panic!("bad test version `{}`: {}", s, e))
}

/// A Visual Studio candidate for windows-x64.
pub fn windows_candidate(id: &str, toolset: &str, sdk: &str, origin: Origin) -> Candidate {
    let root = PathBuf::from("C:/VS").join(id);
    Candidate {
        id: id.to_string(),
        version: version(toolset),
        secondary: Some(version(sdk)),
        platform: Platform::Windows,
        arch: Architecture::X64,
        origin,
        layout: SdkLayout::Windows(VisualStudioLayout {
            bin_paths: vec![root.join("bin")],
            include_paths: vec![root.join("include")],
            library_paths: vec![root.join("lib")],
        }),
        placeholder: false,
    }
}

/// A Linux clang candidate for linux-x64.
pub fn linux_candidate(id: &str, clang: &str, origin: Origin) -> Candidate {
    let root = PathBuf::from("/opt/toolchains").join(id);
    Candidate {
        id: id.to_string(),
        version: version(clang),
        secondary: None,
        platform: Platform::Linux,
        arch: Architecture::X64,
        origin,
        layout: SdkLayout::Linux(LinuxClangLayout {
            sysroot: root.join("sysroot"),
            gcc_toolchain: root.join("gcc"),
            tools_path: root.join("bin"),
            target_triple: "x86_64-glibc2.17-linux-gnu".to_string(),
        }),
        placeholder: false,
    }
}

/// A macOS SDK candidate; `sdk` is the toolset version the Mac constraint pins.
pub fn mac_candidate(id: &str, sdk: &str, arch: Architecture, origin: Origin) -> Candidate {
    let root = PathBuf::from("/Applications/Xcode.app").join(id);
    Candidate {
        id: id.to_string(),
        version: version(sdk),
        secondary: None,
        platform: Platform::Mac,
        arch,
        origin,
        layout: SdkLayout::Mac(MacLayout {
            bin_path: root.join("usr/bin"),
            sysroot: root.join("SDKs/MacOSX.sdk"),
        }),
        placeholder: false,
    }
}

/// Manifest pinning [`TEST_TOOLSET`] and [`TEST_WINDOWS_SDK`].
pub fn test_manifest() -> VersionManifest {
    let mut manifest = VersionManifest::default();
    manifest.insert("vs2022-toolchain", TEST_TOOLSET);
    manifest.insert("win10sdk", TEST_WINDOWS_SDK);
    manifest
}

/// A planning context for `host` over the given locators.
///
/// Uses the default configuration with a fixed job count and a fixed host
/// search path.
pub fn context_with(host: Platform, locators: Vec<CatalogLocator>) -> PlanningContext {
    let mut config = Config::default();
    config.build.jobs = Some(8);

    let mut catalog = CandidateCatalog::new("tbb");
    for locator in locators {
        catalog.add_locator(locator);
    }

    PlanningContext::new(config, test_manifest(), catalog, host)
        .with_host_path(vec![PathBuf::from("/usr/bin")])
}
