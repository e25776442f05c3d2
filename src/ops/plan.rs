//! The planning pass.
//!
//! Expands the host's build matrix, resolves a toolchain per configuration,
//! and declares every configuration's pipeline into one action graph.
//! Nothing here runs a command; the graph is handed to an execution backend.

use std::fmt::Write;

use serde::Serialize;

use crate::builder::action::ActionGraph;
use crate::builder::environment::build_environment;
use crate::builder::matrix::{self, ConfigurationKey};
use crate::builder::pipeline::ConfigurationPipeline;
use crate::core::catalog::Locator;
use crate::core::error::PlanError;
use crate::core::platform::Platform;
use crate::resolver::{resolve, resolve_default_or_latest, Constraint, Resolution};
use crate::util::context::PlanningContext;
use crate::util::diagnostic::Diagnostic;

/// Result of one planning run.
#[derive(Debug, Clone, Serialize)]
pub struct BuildProgram {
    /// Platform the plan was made for
    pub host: Platform,
    /// One pipeline per configuration, in matrix order
    pub pipelines: Vec<ConfigurationPipeline>,
    /// All declared actions and aliases
    pub graph: ActionGraph,
}

impl BuildProgram {
    /// Every alias of the program, sorted.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.graph.aliases.keys().map(String::as_str)
    }

    /// The graph restricted to the given aliases (the full graph if none).
    pub fn graph_for(&self, aliases: &[String]) -> Result<ActionGraph, PlanError> {
        if aliases.is_empty() {
            return Ok(self.graph.clone());
        }
        self.graph.select(aliases)
    }

    pub fn fallback_count(&self) -> usize {
        self.pipelines
            .iter()
            .filter(|p| p.resolution.is_fallback())
            .count()
    }
}

/// Plan every configuration for the context's host.
///
/// Fails on the first unsupported platform, architecture or toolchain and on
/// a missing manifest entry. A configuration without a matching toolchain is
/// not a failure; it is planned with the fallback candidate.
pub fn plan(ctx: &PlanningContext) -> Result<BuildProgram, PlanError> {
    let host = ctx.host();
    let keys = matrix::expand(&host.host_targets())?;
    tracing::debug!("planning {} configuration(s) for host {}", keys.len(), host);

    let mut graph = ActionGraph::new();
    let mut pipelines = Vec::with_capacity(keys.len());

    for key in keys {
        let resolution = resolve_configuration(ctx, &key)?;
        let environment =
            build_environment(ctx.config(), ctx.host_path(), resolution.candidate(), &key)?;

        let pipeline = ConfigurationPipeline::new(ctx.config(), key, resolution, environment);
        pipeline.add_to(&mut graph);
        pipelines.push(pipeline);
    }

    // Cycles can only come from overlapping configured paths.
    graph.topological_order()?;

    Ok(BuildProgram {
        host,
        pipelines,
        graph,
    })
}

/// Resolve the toolchain of one configuration.
///
/// Linux prefers the locator default and otherwise takes the newest
/// candidate; the other families resolve against a manifest- or
/// config-derived constraint.
pub fn resolve_configuration(
    ctx: &PlanningContext,
    key: &ConfigurationKey,
) -> Result<Resolution, PlanError> {
    let found = ctx.catalog().locator_for(key.platform(), key.arch());
    let locator: &dyn Locator = &*found;

    let resolution = match key.platform() {
        Platform::Linux => resolve_default_or_latest(ctx, locator),
        platform @ (Platform::Windows | Platform::Mac) => {
            let constraint = Constraint::for_platform(platform, ctx.config(), ctx.manifest())?;
            resolve(ctx, locator, &constraint)
        }
    };

    match &resolution {
        Resolution::Selected(candidate) => {
            tracing::info!("{}: using {}", key, candidate)
        }
        Resolution::Fallback(fallback) => {
            tracing::debug!("{}: falling back to {}", key, fallback.candidate)
        }
    }

    Ok(resolution)
}

/// Human-readable toolchain report: one line per configuration followed by
/// the fallback diagnostics of the run.
pub fn format_toolchain_report(
    program: &BuildProgram,
    diagnostics: &[Diagnostic],
    color: bool,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Toolchains for host {}:", program.host);
    for pipeline in &program.pipelines {
        let candidate = pipeline.resolution.candidate();
        let status = match (&pipeline.resolution, candidate.placeholder) {
            (Resolution::Selected(_), _) => "[OK]",
            (Resolution::Fallback(_), false) => "[default]",
            (Resolution::Fallback(_), true) => "[missing]",
        };
        let _ = writeln!(
            output,
            "  {:<20} {:<10} {}",
            pipeline.config_id, status, candidate
        );
    }

    for diagnostic in diagnostics {
        let _ = writeln!(output);
        output.push_str(&diagnostic.format(color));
    }

    output
}

/// One alias per line with the paths it stands for.
pub fn format_aliases(program: &BuildProgram) -> String {
    let mut output = String::new();
    for (name, paths) in &program.graph.aliases {
        let _ = writeln!(output, "{}", name);
        for path in paths {
            let _ = writeln!(output, "    {}", path.display());
        }
    }
    output
}
