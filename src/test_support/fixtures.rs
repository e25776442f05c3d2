//! On-disk project fixtures.
//!
//! Writes the three planning inputs (`dockyard.toml`, `manifest.toml`,
//! `catalog.toml`) into a directory so tests can go through
//! [`PlanningContext::load`](crate::util::context::PlanningContext::load).

use std::path::Path;

/// Catalog with one local clang for linux-x64 and one local plus one
/// downloadable Visual Studio for windows-x64.
pub const CATALOG_TOML: &str = r#"
component = "tbb"

[[locator]]
platform = "linux"
arch = "x64"

[[locator.candidate]]
id = "clang-14"
version = "14.0"
layout = { family = "linux", sysroot = "/opt/sysroot", gcc_toolchain = "/opt/gcc", tools_path = "/opt/clang/bin" }

[[locator]]
platform = "windows"
arch = "x64"

[[locator.candidate]]
id = "vs-local"
version = "14.34.31933"
secondary = "10.0.19041.0"
layout = { family = "windows", bin_paths = ["C:/VS/bin"], include_paths = ["C:/VS/include"], library_paths = ["C:/VS/lib"] }

[[locator.candidate]]
id = "vs-online"
version = "14.34.31937"
secondary = "10.0.19041.0"
origin = "downloadable"
layout = { family = "windows", bin_paths = ["D:/VS/bin"] }
"#;

pub const MANIFEST_TOML: &str = r#"
[artifacts]
vs2022-toolchain = "14.34.31933"
win10sdk = "10.0.19041.0"
"#;

pub const CONFIG_TOML: &str = r#"
[build]
jobs = 4
"#;

/// The three planning input files.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    pub config: String,
    pub manifest: String,
    pub catalog: String,
}

impl Default for ProjectFixture {
    fn default() -> Self {
        ProjectFixture {
            config: CONFIG_TOML.to_string(),
            manifest: MANIFEST_TOML.to_string(),
            catalog: CATALOG_TOML.to_string(),
        }
    }
}

impl ProjectFixture {
    /// Replace the manifest contents.
    pub fn with_manifest(mut self, manifest: impl Into<String>) -> Self {
        self.manifest = manifest.into();
        self
    }

    /// Write the fixture into `dir`.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<()> {
        std::fs::write(dir.join("dockyard.toml"), &self.config)?;
        std::fs::write(dir.join("manifest.toml"), &self.manifest)?;
        std::fs::write(dir.join("catalog.toml"), &self.catalog)?;
        Ok(())
    }
}
