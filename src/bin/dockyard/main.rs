//! Dockyard CLI - toolchain resolution and build planning for native components

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging; stdout is reserved for command output
    let filter = if cli.verbose {
        EnvFilter::new("dockyard=debug")
    } else {
        EnvFilter::new("dockyard=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    let color = !cli.no_color;

    // Execute command
    match cli.command {
        Commands::Plan(args) => commands::plan::execute(&cli.inputs, args, color),
        Commands::Toolchain(args) => commands::toolchain::execute(&cli.inputs, args, color),
        Commands::Aliases(args) => commands::aliases::execute(&cli.inputs, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
