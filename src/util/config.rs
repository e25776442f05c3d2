//! Configuration file support for Dockyard.
//!
//! Dockyard reads two configuration file locations:
//! - Global: `~/.dockyard/config.toml` - User-wide defaults
//! - Project: `dockyard.toml` - Project-specific settings
//!
//! Project config takes precedence over global config, table by table.
//! Every setting has a default, so an empty file is a valid configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::error::PlanError;
use crate::core::version::ToolVersion;

/// Project configuration file name.
pub const PROJECT_CONFIG_FILE: &str = "dockyard.toml";

/// Dockyard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The component being built and packaged
    pub component: ComponentConfig,

    /// Directory and file naming
    pub layout: LayoutConfig,

    /// External tools and parallelism
    pub build: BuildConfig,

    /// Windows family settings
    pub windows: WindowsConfig,

    /// Mac family settings
    pub mac: MacConfig,

    /// Linux family settings
    pub linux: LinuxConfig,
}

/// Component identity and the source files the pipeline reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComponentConfig {
    /// Component id, the first part of every archive name
    pub id: String,
    /// Prefix of the generated package descriptor files
    pub descriptor_prefix: String,
    /// Installed header that carries the version token
    pub version_header: PathBuf,
    /// License file shipped in every archive
    pub license_file: PathBuf,
    /// Public header directory in the source tree
    pub include_dir: PathBuf,
    /// Script that renders the package descriptors
    pub config_installer: PathBuf,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        ComponentConfig {
            id: "tbb".to_string(),
            descriptor_prefix: "TBB".to_string(),
            version_header: PathBuf::from("include/tbb/tbb_stddef.h"),
            license_file: PathBuf::from("LICENSE"),
            include_dir: PathBuf::from("include"),
            config_installer: PathBuf::from("cmake/tbb_config_installer.cmake"),
        }
    }
}

/// Output directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Root of the per-configuration build directories
    pub build_root: PathBuf,
    /// Root of the per-configuration install trees
    pub install_root: PathBuf,
    /// Directory receiving the archives
    pub artifact_root: PathBuf,
    /// Install subdirectory holding the package descriptors
    pub descriptor_dir: String,
    /// File extension of the package descriptors
    pub descriptor_extension: String,
    /// File extension of the archives
    pub archive_extension: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            build_root: PathBuf::from("build"),
            install_root: PathBuf::from("builds"),
            artifact_root: PathBuf::from("artifacts/for-stevedore"),
            descriptor_dir: "cmake".to_string(),
            descriptor_extension: "cmake".to_string(),
            archive_extension: "7z".to_string(),
        }
    }
}

/// External tools invoked by the declared actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Worker count passed to the build driver (None = host parallelism)
    pub jobs: Option<usize>,
    /// Build driver program
    pub driver: String,
    /// Program that renders package descriptors
    pub configure_tool: String,
    /// Packer receiving `<archive> <source>=<dest>...`
    pub archiver: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            jobs: None,
            driver: "make".to_string(),
            configure_tool: "cmake".to_string(),
            archiver: "7z-pack".to_string(),
        }
    }
}

impl BuildConfig {
    /// Effective worker count for the build driver.
    pub fn jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// Windows family settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowsConfig {
    /// Manifest artifact pinning the MSVC toolset
    pub toolset_artifact: String,
    /// Manifest artifact pinning the Windows SDK
    pub sdk_artifact: String,
    /// Extra compiler flags
    pub compile_flags: Vec<String>,
    /// Copy wrapper that maps robocopy exit codes to 0/1
    pub copy_tool: String,
    /// Build outputs installed into `bin/`
    pub bin_patterns: Vec<String>,
    /// Build outputs installed into `lib/`
    pub lib_patterns: Vec<String>,
}

impl Default for WindowsConfig {
    fn default() -> Self {
        WindowsConfig {
            toolset_artifact: "vs2022-toolchain".to_string(),
            sdk_artifact: "win10sdk".to_string(),
            compile_flags: vec!["/D_ITERATOR_DEBUG_LEVEL=0".to_string()],
            copy_tool: "robocopy.bat".to_string(),
            bin_patterns: vec!["tbb*.dll".to_string(), "tbb*.pdb".to_string()],
            lib_patterns: vec!["tbb*.lib".to_string()],
        }
    }
}

/// Mac family settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MacConfig {
    /// Required macOS SDK version
    pub sdk_version: ToolVersion,
    /// Deployment target for x64
    pub min_os_x64: String,
    /// Deployment target for arm64
    pub min_os_arm64: String,
    /// Build outputs installed into `lib/`
    pub lib_pattern: String,
}

impl Default for MacConfig {
    fn default() -> Self {
        MacConfig {
            sdk_version: ToolVersion::new(11, 1),
            min_os_x64: "10.14".to_string(),
            min_os_arm64: "11.0".to_string(),
            lib_pattern: "libtbb*.*".to_string(),
        }
    }
}

/// Linux family settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinuxConfig {
    /// Extra compiler flags
    pub compile_flags: Vec<String>,
    /// Extra linker flags (appended after the compiler flags)
    pub link_flags: Vec<String>,
    /// Build outputs installed into `lib/`
    pub lib_pattern: String,
}

impl Default for LinuxConfig {
    fn default() -> Self {
        LinuxConfig {
            compile_flags: vec!["-D_GLIBCXX_USE_CXX11_ABI=0".to_string()],
            link_flags: vec!["-fuse-ld=lld".to_string(), "-static-libstdc++".to_string()],
            lib_pattern: "libtbb*.*".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a single file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_layered(None, path)
    }

    /// Load configuration with a global file underneath the project file.
    ///
    /// Missing files are skipped. Tables are merged recursively; values in
    /// the project file replace values in the global file.
    pub fn load_layered(global_path: Option<&Path>, project_path: &Path) -> Result<Self> {
        let mut merged = toml::Table::new();

        for path in global_path.into_iter().chain(std::iter::once(project_path)) {
            if !path.exists() {
                tracing::debug!("config file not found, skipping: {}", path.display());
                continue;
            }
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let table: toml::Table = toml::from_str(&contents)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            merge_tables(&mut merged, table);
        }

        let config: Config = toml::Value::Table(merged)
            .try_into()
            .context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the job count is positive and every install pattern is a
    /// well-formed glob.
    pub fn validate(&self) -> Result<(), PlanError> {
        if let Some(jobs @ 0) = self.build.jobs {
            return Err(PlanError::InvalidJobs { jobs });
        }

        let patterns = self
            .windows
            .bin_patterns
            .iter()
            .chain(&self.windows.lib_patterns)
            .chain(std::iter::once(&self.mac.lib_pattern))
            .chain(std::iter::once(&self.linux.lib_pattern));

        for pattern in patterns {
            glob::Pattern::new(pattern).map_err(|e| PlanError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.msg.to_string(),
            })?;
        }
        Ok(())
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

/// Get the global dockyard config directory (~/.dockyard).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".dockyard"))
}

/// Get the global config path (~/.dockyard/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.component.id, "tbb");
        assert_eq!(config.layout.archive_extension, "7z");
        assert_eq!(config.mac.sdk_version, ToolVersion::new(11, 1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_jobs_override() {
        let build = BuildConfig {
            jobs: Some(3),
            ..BuildConfig::default()
        };
        assert_eq!(build.jobs(), 3);
        assert!(BuildConfig::default().jobs() >= 1);
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(&tmp.path().join("dockyard.toml")).unwrap();
        assert_eq!(config.layout.install_root, PathBuf::from("builds"));
    }

    #[test]
    fn test_layered_merge() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("dockyard.toml");

        std::fs::write(
            &global,
            "[build]\njobs = 4\ndriver = \"gmake\"\n[component]\nid = \"zlib\"\n",
        )
        .unwrap();
        std::fs::write(&project, "[build]\njobs = 16\n").unwrap();

        let config = Config::load_layered(Some(&global), &project).unwrap();
        assert_eq!(config.build.jobs, Some(16));
        assert_eq!(config.build.driver, "gmake");
        assert_eq!(config.component.id, "zlib");
        assert_eq!(config.build.configure_tool, "cmake");
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let tmp = TempDir::new().unwrap();
        let project = tmp.path().join("dockyard.toml");
        std::fs::write(&project, "[linux]\nlib_pattern = \"libtbb[\"\n").unwrap();

        let err = Config::load(&project).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid file pattern"));
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let tmp = TempDir::new().unwrap();
        let project = tmp.path().join("dockyard.toml");
        std::fs::write(&project, "[build]\njobs = 0\n").unwrap();

        let err = Config::load(&project).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid job count `0`"));

        let config = Config {
            build: BuildConfig {
                jobs: Some(0),
                ..BuildConfig::default()
            },
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PlanError::InvalidJobs { jobs: 0 })
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        let project = tmp.path().join("dockyard.toml");
        std::fs::write(&project, "[layout]\nbogus = 1\n").unwrap();

        assert!(Config::load(&project).is_err());
    }
}
