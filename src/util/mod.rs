//! Shared utilities

pub mod config;
pub mod context;
pub mod diagnostic;
pub mod hash;
pub mod once;

pub use config::Config;
pub use context::{InputPaths, PlanningContext};
pub use diagnostic::Diagnostic;
pub use once::ExecuteOnce;
