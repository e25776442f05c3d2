//! Planning context.
//!
//! One `PlanningContext` lives for exactly one planning run. It owns the
//! read-only inputs (configuration, version manifest, candidate catalog,
//! host environment) and the only shared mutable state of a run: the
//! fallback diagnostic memo and the diagnostics emitted so far.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::Result;

use crate::core::catalog::CandidateCatalog;
use crate::core::manifest::VersionManifest;
use crate::core::platform::Platform;
use crate::resolver::{Constraint, FallbackOutcome};
use crate::util::config::{global_config_path, Config, PROJECT_CONFIG_FILE};
use crate::util::diagnostic::Diagnostic;
use crate::util::once::ExecuteOnce;

/// Default version manifest file name.
pub const MANIFEST_FILE: &str = "manifest.toml";

/// Default candidate catalog file name.
pub const CATALOG_FILE: &str = "catalog.toml";

/// Memo key for fallback diagnostics: (locator identity, constraint).
pub type FallbackKey = (String, Constraint);

#[derive(Debug)]
pub struct PlanningContext {
    config: Config,
    manifest: VersionManifest,
    catalog: CandidateCatalog,
    host: Platform,
    host_path: Vec<PathBuf>,
    fallbacks: ExecuteOnce<FallbackKey, FallbackOutcome>,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

/// Input file locations for [`PlanningContext::load`].
#[derive(Debug, Clone)]
pub struct InputPaths {
    /// User-wide config layered under the project config
    pub global_config: Option<PathBuf>,
    pub config: PathBuf,
    pub manifest: PathBuf,
    pub catalog: PathBuf,
}

impl InputPaths {
    /// Default file names inside a project directory, without a global config.
    pub fn in_dir(dir: &Path) -> Self {
        InputPaths {
            global_config: None,
            config: dir.join(PROJECT_CONFIG_FILE),
            manifest: dir.join(MANIFEST_FILE),
            catalog: dir.join(CATALOG_FILE),
        }
    }

    /// Default file names inside a project directory, layered over
    /// `~/.dockyard/config.toml`.
    pub fn discover(dir: &Path) -> Self {
        InputPaths {
            global_config: global_config_path(),
            ..Self::in_dir(dir)
        }
    }
}

impl PlanningContext {
    /// Create a context from already-loaded inputs.
    ///
    /// The host `PATH` is captured once here so that every configuration of
    /// the run sees the same search path.
    pub fn new(
        config: Config,
        manifest: VersionManifest,
        catalog: CandidateCatalog,
        host: Platform,
    ) -> Self {
        let host_path = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect())
            .unwrap_or_default();

        PlanningContext {
            config,
            manifest,
            catalog,
            host,
            host_path,
            fallbacks: ExecuteOnce::new(),
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    /// Load all inputs from disk.
    pub fn load(paths: &InputPaths, host: Platform) -> Result<Self> {
        let config = Config::load_layered(paths.global_config.as_deref(), &paths.config)?;
        let manifest = VersionManifest::load(&paths.manifest)?;
        let catalog = CandidateCatalog::load(&paths.catalog)?;

        if catalog.component() != config.component.id {
            tracing::warn!(
                "catalog describes `{}` but the configured component is `{}`",
                catalog.component(),
                config.component.id
            );
        }

        Ok(Self::new(config, manifest, catalog, host))
    }

    /// Replace the captured host search path.
    pub fn with_host_path(mut self, host_path: Vec<PathBuf>) -> Self {
        self.host_path = host_path;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn manifest(&self) -> &VersionManifest {
        &self.manifest
    }

    pub fn catalog(&self) -> &CandidateCatalog {
        &self.catalog
    }

    /// Platform the plan is made for.
    pub fn host(&self) -> Platform {
        self.host
    }

    pub fn host_path(&self) -> &[PathBuf] {
        &self.host_path
    }

    /// Look up the fallback for a key, computing it on first use only.
    pub(crate) fn fallback_once(
        &self,
        key: FallbackKey,
        produce: impl FnOnce() -> FallbackOutcome,
    ) -> FallbackOutcome {
        self.fallbacks.get_or_insert_with(key, produce)
    }

    /// Record a diagnostic and log it.
    pub fn report(&self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic.message);
        for line in diagnostic.context.iter().flat_map(|c| c.lines()) {
            tracing::warn!("  {}", line);
        }
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }

    /// Diagnostics reported so far, in order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
