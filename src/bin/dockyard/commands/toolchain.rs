//! `dockyard toolchain` command

use anyhow::Result;
use dockyard::ops::{format_toolchain_report, plan};

use crate::cli::{HostArgs, InputArgs};
use crate::commands::load_context;

pub fn execute(inputs: &InputArgs, args: HostArgs, color: bool) -> Result<()> {
    let ctx = load_context(inputs, &args)?;
    let program = plan(&ctx)?;

    print!(
        "{}",
        format_toolchain_report(&program, &ctx.diagnostics(), color)
    );

    Ok(())
}
