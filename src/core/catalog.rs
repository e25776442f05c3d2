//! Candidate catalogs.
//!
//! The catalog is a read-only snapshot of every toolchain the external
//! locators know about, grouped per (component, platform, architecture).
//! It is loaded once at the start of a planning run.
//!
//! ```toml
//! component = "tbb"
//!
//! [[locator]]
//! platform = "linux"
//! arch = "x64"
//! default = "clang-14"
//!
//! [[locator.candidate]]
//! id = "clang-14"
//! version = "14.0"
//! origin = "local"
//! layout = { family = "linux", sysroot = "/sdk/sysroot", gcc_toolchain = "/sdk/gcc", tools_path = "/sdk/bin" }
//! ```

use std::borrow::Cow;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::core::candidate::{Candidate, Origin, SdkLayout};
use crate::core::platform::{Architecture, Platform};
use crate::core::version::ToolVersion;

/// Source of toolchain candidates for one platform/architecture.
pub trait Locator: Send + Sync {
    /// Stable identity of this locator; part of the diagnostic memo key.
    fn identity(&self) -> &str;

    fn platform(&self) -> Platform;

    fn arch(&self) -> Architecture;

    /// All candidates, in enumeration order.
    fn all(&self) -> &[Candidate];

    /// The default the user configured for this locator, if any.
    fn user_default(&self) -> Option<&Candidate>;

    /// Inert stand-in used when nothing else is available.
    fn placeholder(&self) -> Candidate {
        Candidate::placeholder(self.platform(), self.arch())
    }
}

/// A locator backed by a catalog file entry.
#[derive(Debug, Clone)]
pub struct CatalogLocator {
    identity: String,
    platform: Platform,
    arch: Architecture,
    candidates: Vec<Candidate>,
    user_default: Option<usize>,
}

impl CatalogLocator {
    pub fn new(
        component: &str,
        platform: Platform,
        arch: Architecture,
        candidates: Vec<Candidate>,
    ) -> Self {
        CatalogLocator {
            identity: format!("{}/{}-{}", component, platform, arch),
            platform,
            arch,
            candidates,
            user_default: None,
        }
    }

    /// A locator that knows no candidates at all.
    pub fn empty(component: &str, platform: Platform, arch: Architecture) -> Self {
        Self::new(component, platform, arch, Vec::new())
    }

    /// Mark the candidate with the given id as the user default.
    pub fn with_default(mut self, id: &str) -> Result<Self> {
        let Some(index) = self.candidates.iter().position(|c| c.id == id) else {
            bail!(
                "default candidate `{}` is not listed by locator `{}`",
                id,
                self.identity
            );
        };
        self.user_default = Some(index);
        Ok(self)
    }
}

impl Locator for CatalogLocator {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    fn arch(&self) -> Architecture {
        self.arch
    }

    fn all(&self) -> &[Candidate] {
        &self.candidates
    }

    fn user_default(&self) -> Option<&Candidate> {
        self.user_default.map(|i| &self.candidates[i])
    }
}

/// Snapshot of all locators for one component.
#[derive(Debug, Clone, Default)]
pub struct CandidateCatalog {
    component: String,
    locators: Vec<CatalogLocator>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    component: String,
    #[serde(default, rename = "locator")]
    locators: Vec<LocatorEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LocatorEntry {
    platform: Platform,
    arch: Architecture,
    #[serde(default)]
    default: Option<String>,
    #[serde(default, rename = "candidate")]
    candidates: Vec<CandidateEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CandidateEntry {
    id: String,
    version: ToolVersion,
    #[serde(default)]
    secondary: Option<ToolVersion>,
    #[serde(default = "default_origin")]
    origin: Origin,
    layout: SdkLayout,
}

fn default_origin() -> Origin {
    Origin::Local
}

impl CandidateCatalog {
    pub fn new(component: impl Into<String>) -> Self {
        CandidateCatalog {
            component: component.into(),
            locators: Vec::new(),
        }
    }

    /// Add a locator to the catalog.
    pub fn add_locator(&mut self, locator: CatalogLocator) {
        self.locators.push(locator);
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// Load a catalog from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("failed to parse catalog: {}", path.display()))
    }

    /// Parse a catalog from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(contents)?;
        let mut catalog = CandidateCatalog::new(&file.component);

        for entry in file.locators {
            if catalog
                .locators
                .iter()
                .any(|l| l.platform == entry.platform && l.arch == entry.arch)
            {
                bail!(
                    "duplicate locator for {}-{}",
                    entry.platform,
                    entry.arch
                );
            }

            let candidates = entry
                .candidates
                .into_iter()
                .map(|c| Candidate {
                    id: c.id,
                    version: c.version,
                    secondary: c.secondary,
                    platform: entry.platform,
                    arch: entry.arch,
                    origin: c.origin,
                    layout: c.layout,
                    placeholder: false,
                })
                .collect();

            let mut locator =
                CatalogLocator::new(&file.component, entry.platform, entry.arch, candidates);
            if let Some(ref id) = entry.default {
                locator = locator.with_default(id)?;
            }

            tracing::debug!(
                "catalog locator {} lists {} candidate(s)",
                locator.identity(),
                locator.all().len()
            );
            catalog.locators.push(locator);
        }

        Ok(catalog)
    }

    /// Locator for a platform/architecture.
    ///
    /// A pair the catalog does not mention yields an empty locator, which
    /// resolves to the placeholder through the fallback path.
    pub fn locator_for(&self, platform: Platform, arch: Architecture) -> Cow<'_, CatalogLocator> {
        match self
            .locators
            .iter()
            .find(|l| l.platform == platform && l.arch == arch)
        {
            Some(locator) => Cow::Borrowed(locator),
            None => Cow::Owned(CatalogLocator::empty(&self.component, platform, arch)),
        }
    }
}
