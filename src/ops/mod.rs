//! High-level operations.
//!
//! This module contains the implementation of dockyard commands.

pub mod plan;

pub use plan::{
    format_aliases, format_toolchain_report, plan, resolve_configuration, BuildProgram,
};
