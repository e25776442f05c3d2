//! Command implementations

pub mod aliases;
pub mod completions;
pub mod plan;
pub mod toolchain;

use anyhow::{Context, Result};
use dockyard::{InputPaths, PlanningContext, Platform};

use crate::cli::{HostArgs, InputArgs};

/// Load the planning inputs for the requested (or current) host.
pub fn load_context(inputs: &InputArgs, host: &HostArgs) -> Result<PlanningContext> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let defaults = InputPaths::discover(&cwd);

    let paths = InputPaths {
        global_config: defaults.global_config,
        config: inputs.config.clone().unwrap_or(defaults.config),
        manifest: inputs.manifest.clone().unwrap_or(defaults.manifest),
        catalog: inputs.catalog.clone().unwrap_or(defaults.catalog),
    };

    let host = match host.host {
        Some(platform) => platform,
        None => Platform::host()?,
    };

    PlanningContext::load(&paths, host)
}
