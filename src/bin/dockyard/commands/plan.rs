//! `dockyard plan` command

use anyhow::{Context, Result};
use dockyard::ops::plan;
use dockyard::util::diagnostic::{emit, suggestions, Diagnostic};

use crate::cli::{InputArgs, PlanArgs};
use crate::commands::load_context;

pub fn execute(inputs: &InputArgs, args: PlanArgs, color: bool) -> Result<()> {
    let ctx = load_context(inputs, &args.host)?;
    let program = plan(&ctx)?;
    let graph = program.graph_for(&args.aliases)?;

    let json = serde_json::to_string_pretty(&graph).context("failed to serialize action graph")?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", json))
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("wrote action graph to {}", path.display());
        }
        None => println!("{}", json),
    }

    tracing::info!(
        "planned {} action(s) for {} configuration(s), fingerprint {}",
        graph.len(),
        program.pipelines.len(),
        &graph.fingerprint()[..16]
    );

    let fallbacks = program.fallback_count();
    if fallbacks > 0 {
        emit(
            &Diagnostic::note(format!(
                "{} configuration(s) were planned without a matching toolchain",
                fallbacks
            ))
            .with_suggestion(suggestions::SHOW_TOOLCHAINS),
            color,
        );
    }

    Ok(())
}
