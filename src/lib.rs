//! Dockyard - toolchain resolution and build planning for native components
//!
//! This crate selects a toolchain per (platform, architecture, variant)
//! configuration and declares the compile, install, configure and package
//! actions that turn a native library into distributable archives.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities for dockyard unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides candidate builders and planning contexts
/// that do not depend on the host machine.
#[cfg(test)]
pub mod test_support;

pub use builder::{ActionGraph, ConfigurationKey};
pub use core::{Architecture, Candidate, CandidateCatalog, PlanError, Platform, VersionManifest};
pub use ops::{plan, BuildProgram};
pub use resolver::{Constraint, Resolution};
pub use util::context::{InputPaths, PlanningContext};
