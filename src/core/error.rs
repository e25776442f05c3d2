//! Planning error types.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

/// Fatal errors raised while planning a build program.
///
/// An empty candidate set is deliberately absent here: it is routed through
/// the fallback path and downgraded to a warning.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum PlanError {
    #[error("unsupported platform `{platform}` for {context}")]
    #[diagnostic(
        code(dockyard::config::unsupported_platform),
        help("Supported platforms are `windows`, `mac` and `linux`")
    )]
    UnsupportedPlatform { platform: String, context: String },

    #[error("unsupported architecture `{arch}` for {context}")]
    #[diagnostic(code(dockyard::config::unsupported_architecture))]
    UnsupportedArchitecture { arch: String, context: String },

    #[error("unsupported toolchain `{toolchain}` for {context}")]
    #[diagnostic(
        code(dockyard::config::unsupported_toolchain),
        help("Check that the catalog locator lists SDKs of the platform family it is keyed on")
    )]
    UnsupportedToolchain { toolchain: String, context: String },

    #[error("artifact \"{artifact}\" doesn't appear to be described in any of the manifest files")]
    #[diagnostic(
        code(dockyard::manifest::missing_artifact),
        help("Add `{artifact} = \"<version>\"` to the [artifacts] table of the version manifest")
    )]
    ArtifactNotInManifest { artifact: String },

    #[error("invalid version `{version}` for `{artifact}`")]
    #[diagnostic(code(dockyard::manifest::invalid_version))]
    InvalidVersion { artifact: String, version: String },

    #[error("invalid file pattern `{pattern}`: {message}")]
    #[diagnostic(code(dockyard::config::invalid_pattern))]
    InvalidPattern { pattern: String, message: String },

    #[error("invalid job count `{jobs}` in [build]")]
    #[diagnostic(
        code(dockyard::config::invalid_jobs),
        help("Set `jobs` to at least 1, or remove it to use the host's parallelism")
    )]
    InvalidJobs { jobs: usize },

    #[error("unknown alias `{alias}`")]
    #[diagnostic(
        code(dockyard::graph::unknown_alias),
        help("Run `dockyard aliases` to list the aggregate targets")
    )]
    UnknownAlias { alias: String },

    #[error("cycle detected in action graph at `{action}`")]
    #[diagnostic(code(dockyard::graph::cycle))]
    GraphCycle { action: String },
}

impl PlanError {
    pub(crate) fn unsupported_platform(platform: impl ToString, context: &str) -> Self {
        PlanError::UnsupportedPlatform {
            platform: platform.to_string(),
            context: context.to_string(),
        }
    }

    pub(crate) fn unsupported_arch(arch: impl ToString, context: &str) -> Self {
        PlanError::UnsupportedArchitecture {
            arch: arch.to_string(),
            context: context.to_string(),
        }
    }

    pub(crate) fn unsupported_toolchain(toolchain: impl ToString, context: &str) -> Self {
        PlanError::UnsupportedToolchain {
            toolchain: toolchain.to_string(),
            context: context.to_string(),
        }
    }
}
