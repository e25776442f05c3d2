//! Core domain types: platforms, versions, candidates and catalogs.

pub mod candidate;
pub mod catalog;
pub mod error;
pub mod manifest;
pub mod platform;
pub mod version;

pub use candidate::{Candidate, Origin, SdkLayout};
pub use catalog::{CandidateCatalog, CatalogLocator, Locator};
pub use error::PlanError;
pub use manifest::VersionManifest;
pub use platform::{Architecture, Platform};
pub use version::ToolVersion;
