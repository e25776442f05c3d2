//! Per-configuration compiler flags and process environment.
//!
//! Everything that differs between platform families lives in one
//! [`FamilyTable`] per family; the builder below only fills the table's
//! slots from the resolved toolchain layout.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::builder::matrix::ConfigurationKey;
use crate::core::candidate::{Candidate, SdkLayout};
use crate::core::error::PlanError;
use crate::core::platform::{Architecture, Platform};
use crate::util::config::Config;

/// Conventions of one platform family.
#[derive(Debug)]
pub struct FamilyTable {
    /// Separator for search-path style variables
    pub path_separator: &'static str,
    /// Executable search path variable
    pub path_var: &'static str,
    /// Header search path variable, if the compiler reads one
    pub include_var: Option<&'static str>,
    /// Library search path variable, if the linker reads one
    pub library_var: Option<&'static str>,
    /// SDK root variable, if the toolchain reads one
    pub sdkroot_var: Option<&'static str>,
    /// Value of the driver's `compiler=` argument
    pub compiler: &'static str,
    /// Quote wrapped around `CXXFLAGS`/`LDFLAGS` values
    pub flag_quote: char,
    /// Deployment target flag prefix, completed with a per-arch version
    pub min_os_flag: Option<&'static str>,
}

static WINDOWS: FamilyTable = FamilyTable {
    path_separator: ";",
    path_var: "PATH",
    include_var: Some("INCLUDE"),
    library_var: Some("LIB"),
    sdkroot_var: None,
    compiler: "cl",
    flag_quote: '"',
    min_os_flag: None,
};

static MAC: FamilyTable = FamilyTable {
    path_separator: ":",
    path_var: "PATH",
    include_var: None,
    library_var: None,
    sdkroot_var: Some("SDKROOT"),
    compiler: "clang",
    flag_quote: '"',
    min_os_flag: Some("-mmacosx-version-min="),
};

static LINUX: FamilyTable = FamilyTable {
    path_separator: ":",
    path_var: "PATH",
    include_var: None,
    library_var: None,
    sdkroot_var: None,
    compiler: "clang",
    flag_quote: '\'',
    min_os_flag: None,
};

impl FamilyTable {
    pub fn for_platform(platform: Platform) -> &'static FamilyTable {
        match platform {
            Platform::Windows => &WINDOWS,
            Platform::Mac => &MAC,
            Platform::Linux => &LINUX,
        }
    }

    fn join(&self, paths: &[PathBuf]) -> String {
        paths
            .iter()
            .map(|p| native(p))
            .collect::<Vec<_>>()
            .join(self.path_separator)
    }
}

/// Flags and environment for one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformEnvironment {
    /// Value of the driver's `compiler=` argument
    pub compiler: &'static str,
    /// Compiler flags, in order
    pub compile_flags: Vec<String>,
    /// Linker flags, in order (empty when the family passes none)
    pub link_flags: Vec<String>,
    /// Deployment target flags (already part of `compile_flags`)
    pub min_os_flags: Vec<String>,
    /// Process environment for every action of the configuration
    pub env: BTreeMap<String, String>,
    /// Toolchain directories the compile stage reads
    pub toolchain_inputs: Vec<PathBuf>,
    #[serde(skip)]
    flag_quote: char,
}

impl PlatformEnvironment {
    /// Flag assignments appended to the driver command line.
    pub fn driver_flag_args(&self) -> Vec<String> {
        let q = self.flag_quote;
        let mut args = vec![format!("CXXFLAGS={q}{}{q}", self.compile_flags.join(" "))];
        if !self.link_flags.is_empty() {
            args.push(format!("LDFLAGS={q}{}{q}", self.link_flags.join(" ")));
        }
        args
    }
}

/// Derive flags and environment for a resolved toolchain.
///
/// The toolchain layout must belong to the configuration's family.
pub fn build_environment(
    config: &Config,
    host_path: &[PathBuf],
    candidate: &Candidate,
    key: &ConfigurationKey,
) -> Result<PlatformEnvironment, PlanError> {
    let platform = key.platform();
    if candidate.layout.platform() != platform {
        return Err(PlanError::unsupported_toolchain(
            candidate.layout.kind_name(),
            &format!("{} configurations", platform),
        ));
    }

    let table = FamilyTable::for_platform(platform);
    let min_os_flags: Vec<String> =
        match (table.min_os_flag, min_os_version(config, platform, key.arch())) {
            (Some(prefix), Some(version)) => vec![format!("{}{}", prefix, version)],
            _ => Vec::new(),
        };

    let mut env = BTreeMap::new();
    let (bin_paths, toolchain_inputs, mut compile_flags, link_flags) = match &candidate.layout {
        SdkLayout::Windows(vs) => {
            if let Some(var) = table.include_var {
                env.insert(var.to_string(), table.join(&vs.include_paths));
            }
            if let Some(var) = table.library_var {
                env.insert(var.to_string(), table.join(&vs.library_paths));
            }

            let inputs: Vec<PathBuf> = vs
                .bin_paths
                .iter()
                .chain(&vs.include_paths)
                .chain(&vs.library_paths)
                .cloned()
                .collect();
            (
                vs.bin_paths.clone(),
                inputs,
                config.windows.compile_flags.clone(),
                Vec::new(),
            )
        }
        SdkLayout::Mac(mac) => {
            if let Some(var) = table.sdkroot_var {
                env.insert(var.to_string(), native(&mac.sysroot));
            }
            (
                vec![mac.bin_path.clone()],
                vec![mac.bin_path.clone(), mac.sysroot.clone()],
                Vec::new(),
                Vec::new(),
            )
        }
        SdkLayout::Linux(linux) => {
            let mut flags = vec![
                format!("--sysroot=\"{}\"", native(&linux.sysroot)),
                format!("--gcc-toolchain=\"{}\"", native(&linux.gcc_toolchain)),
                format!("-target {}", linux.target_triple),
            ];
            flags.extend(config.linux.compile_flags.iter().cloned());

            let link: Vec<String> = flags
                .iter()
                .chain(&config.linux.link_flags)
                .cloned()
                .collect();
            (
                vec![linux.tools_path.clone()],
                vec![
                    linux.sysroot.clone(),
                    linux.gcc_toolchain.clone(),
                    linux.tools_path.clone(),
                ],
                flags,
                link,
            )
        }
    };

    compile_flags.extend(min_os_flags.iter().cloned());

    let search_path: Vec<PathBuf> = bin_paths
        .into_iter()
        .chain(host_path.iter().cloned())
        .collect();
    env.insert(table.path_var.to_string(), table.join(&search_path));

    tracing::debug!(
        "{}: compiler={} flags=[{}]",
        key,
        table.compiler,
        compile_flags.join(" ")
    );

    Ok(PlatformEnvironment {
        compiler: table.compiler,
        compile_flags,
        link_flags,
        min_os_flags,
        env,
        toolchain_inputs,
        flag_quote: table.flag_quote,
    })
}

/// Deployment target version for a platform/architecture, if the family has one.
fn min_os_version(config: &Config, platform: Platform, arch: Architecture) -> Option<&str> {
    match (platform, arch) {
        (Platform::Mac, Architecture::Arm64) => Some(config.mac.min_os_arm64.as_str()),
        (Platform::Mac, _) => Some(config.mac.min_os_x64.as_str()),
        (Platform::Windows, _) | (Platform::Linux, _) => None,
    }
}

/// Render a path as a host-native string.
pub(crate) fn native(path: &Path) -> String {
    path.display().to_string()
}
