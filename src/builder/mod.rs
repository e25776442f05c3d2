//! Build matrix, environments and the declared action pipeline.
//!
//! Nothing in this module executes a command: it declares actions and the
//! paths they touch, and the execution backend decides when to run them.

pub mod action;
pub mod environment;
pub mod matrix;
pub mod pipeline;

pub use action::{Action, ActionGraph};
pub use environment::{build_environment, FamilyTable, PlatformEnvironment};
pub use matrix::{expand, BuildVariant, ConfigurationKey};
pub use pipeline::{Artifact, ArtifactEntry, ConfigurationPipeline, Stage, StageKind};
