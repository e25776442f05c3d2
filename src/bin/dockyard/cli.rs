//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use dockyard::Platform;

/// Dockyard - toolchain resolution and build planning for native components
#[derive(Parser)]
#[command(name = "dockyard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(flatten)]
    pub inputs: InputArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Locations of the planning inputs; each defaults to the current directory.
#[derive(Args)]
pub struct InputArgs {
    /// Project configuration file [default: ./dockyard.toml]
    #[arg(long, global = true, env = "DOCKYARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Version manifest file [default: ./manifest.toml]
    #[arg(long, global = true, env = "DOCKYARD_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Candidate catalog file [default: ./catalog.toml]
    #[arg(long, global = true, env = "DOCKYARD_CATALOG")]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Plan the build and print the action graph as JSON
    Plan(PlanArgs),

    /// Show the toolchain resolved for each configuration
    Toolchain(HostArgs),

    /// List the aggregate targets of the plan
    Aliases(HostArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct HostArgs {
    /// Plan for this host platform instead of the current one
    #[arg(long)]
    pub host: Option<Platform>,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub host: HostArgs,

    /// Only emit the actions needed for this alias (repeatable)
    #[arg(long = "alias", value_name = "ALIAS")]
    pub aliases: Vec<String>,

    /// Write the graph to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
