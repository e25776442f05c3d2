//! `dockyard aliases` command

use anyhow::Result;
use dockyard::ops::{format_aliases, plan};

use crate::cli::{HostArgs, InputArgs};
use crate::commands::load_context;

pub fn execute(inputs: &InputArgs, args: HostArgs) -> Result<()> {
    let ctx = load_context(inputs, &args)?;
    let program = plan(&ctx)?;

    print!("{}", format_aliases(&program));

    Ok(())
}
