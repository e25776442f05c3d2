//! Toolchain resolution.
//!
//! Resolution is a pure function of the catalog snapshot and a constraint:
//! filter by [`Constraint::matches`], rank, take the first. When nothing
//! matches, the fallback path picks the locator default or a placeholder
//! and reports one warning per (locator, constraint) for the planning run.

pub mod constraint;
pub mod resolve;

pub use constraint::Constraint;
pub use resolve::{
    resolve, resolve_default_or_latest, select, Fallback, FallbackOutcome, Resolution,
};
