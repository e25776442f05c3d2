//! Per-configuration action pipeline.
//!
//! Every configuration gets the same four stages in the same order:
//! compile, install, configure, package. Stages are linked only through
//! their declared paths; see [`ActionGraph::dependency_graph`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::builder::action::{Action, ActionGraph};
use crate::builder::environment::{native, PlatformEnvironment};
use crate::builder::matrix::ConfigurationKey;
use crate::core::platform::Platform;
use crate::resolver::Resolution;
use crate::util::config::Config;

/// Prefix of the install aggregate target.
pub const INSTALL_ALIAS_PREFIX: &str = "lib";

/// Prefix of the archive aggregate target.
pub const PACKAGE_ALIAS_PREFIX: &str = "buildzip";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Compile,
    Install,
    Configure,
    Package,
}

impl StageKind {
    pub const ALL: [StageKind; 4] = [
        StageKind::Compile,
        StageKind::Install,
        StageKind::Configure,
        StageKind::Package,
    ];
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Compile => write!(f, "compile"),
            StageKind::Install => write!(f, "install"),
            StageKind::Configure => write!(f, "configure"),
            StageKind::Package => write!(f, "package"),
        }
    }
}

/// One stage and the actions it declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub kind: StageKind,
    pub actions: Vec<Action>,
}

/// One entry copied into an archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactEntry {
    /// Path in the workspace
    pub source: PathBuf,
    /// Path inside the archive
    pub dest: PathBuf,
}

/// The archive a configuration terminates in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub path: PathBuf,
    pub entries: Vec<ArtifactEntry>,
}

impl Artifact {
    /// Whether the archive carries an entry at `dest`.
    pub fn contains(&self, dest: impl AsRef<Path>) -> bool {
        self.entries.iter().any(|e| e.dest == dest.as_ref())
    }
}

/// Directories and files of one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineLayout {
    /// Build driver output, `<build-root>/<configId>_<cfg>`
    pub build_dir: PathBuf,
    /// Install tree, `<install-root>/<configId>`
    pub install_dir: PathBuf,
    /// `bin/` of the install tree; only Windows installs it
    pub bin_dir: Option<PathBuf>,
    pub lib_dir: PathBuf,
    pub include_dir: PathBuf,
    /// The two generated package descriptors
    pub descriptors: [PathBuf; 2],
}

impl PipelineLayout {
    pub fn new(config: &Config, key: &ConfigurationKey) -> Self {
        let layout = &config.layout;
        let config_id = key.config_id();
        let build_dir = layout
            .build_root
            .join(format!("{}_{}", config_id, key.variant().cfg_name()));
        let install_dir = layout.install_root.join(&config_id);

        let descriptor_dir = install_dir.join(&layout.descriptor_dir);
        let prefix = &config.component.descriptor_prefix;
        let ext = &layout.descriptor_extension;
        let descriptors = [
            descriptor_dir.join(format!("{}Config.{}", prefix, ext)),
            descriptor_dir.join(format!("{}ConfigVersion.{}", prefix, ext)),
        ];

        PipelineLayout {
            bin_dir: (!key.platform().is_posix()).then(|| install_dir.join("bin")),
            lib_dir: install_dir.join("lib"),
            include_dir: install_dir.join("include"),
            build_dir,
            install_dir,
            descriptors,
        }
    }

    /// Install outputs in archive order.
    pub fn installed_dirs(&self) -> Vec<PathBuf> {
        self.bin_dir
            .iter()
            .chain([&self.lib_dir, &self.include_dir])
            .cloned()
            .collect()
    }
}

/// Everything planned for one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationPipeline {
    pub key: ConfigurationKey,
    pub config_id: String,
    pub resolution: Resolution,
    pub environment: PlatformEnvironment,
    pub layout: PipelineLayout,
    pub stages: Vec<Stage>,
    pub artifact: Artifact,
    pub install_alias: String,
    pub package_alias: String,
}

impl ConfigurationPipeline {
    /// Declare the four stages for a resolved configuration.
    pub fn new(
        config: &Config,
        key: ConfigurationKey,
        resolution: Resolution,
        environment: PlatformEnvironment,
    ) -> Self {
        let config_id = key.config_id();
        let layout = PipelineLayout::new(config, &key);
        let artifact = artifact_for(config, &key, &layout);

        let stages = vec![
            Stage {
                kind: StageKind::Compile,
                actions: vec![compile_action(config, &key, &environment, &layout)],
            },
            Stage {
                kind: StageKind::Install,
                actions: install_actions(config, &key, &layout),
            },
            Stage {
                kind: StageKind::Configure,
                actions: vec![configure_action(config, &key, &environment, &layout)],
            },
            Stage {
                kind: StageKind::Package,
                actions: vec![package_action(config, &config_id, &artifact)],
            },
        ];

        tracing::debug!(
            "{}: {} actions, archive {}",
            key,
            stages.iter().map(|s| s.actions.len()).sum::<usize>(),
            artifact.path.display()
        );

        ConfigurationPipeline {
            install_alias: format!("{}::{}", INSTALL_ALIAS_PREFIX, config_id),
            package_alias: format!("{}::{}", PACKAGE_ALIAS_PREFIX, config_id),
            key,
            config_id,
            resolution,
            environment,
            layout,
            stages,
            artifact,
        }
    }

    /// Actions of every stage, in stage order.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.stages.iter().flat_map(|s| &s.actions)
    }

    pub fn stage(&self, kind: StageKind) -> Option<&Stage> {
        self.stages.iter().find(|s| s.kind == kind)
    }

    /// Add this pipeline's actions and its two aggregate targets to a graph.
    pub fn add_to(&self, graph: &mut ActionGraph) {
        for action in self.actions() {
            graph.add_action(action.clone());
        }
        graph.add_alias(&self.install_alias, self.layout.installed_dirs());
        graph.add_alias(&self.package_alias, [self.artifact.path.clone()]);
    }
}

fn compile_action(
    config: &Config,
    key: &ConfigurationKey,
    environment: &PlatformEnvironment,
    layout: &PipelineLayout,
) -> Action {
    // The driver parallelizes internally, so the backend must not add more.
    Action::new("make", key.config_id(), &config.build.driver)
        .arg(format!("arch={}", key.arch_token()))
        .arg(format!("compiler={}", environment.compiler))
        .arg(format!("cfg={}", key.variant().cfg_name()))
        .arg(format!("tbb_build_prefix={}", key.config_id()))
        .arg("-j")
        .arg(config.build.jobs().to_string())
        .args(environment.driver_flag_args())
        .envs(&environment.env)
        .inputs(environment.toolchain_inputs.iter().cloned())
        .output_dir(&layout.build_dir)
        .exclusive()
}

fn install_actions(config: &Config, key: &ConfigurationKey, layout: &PipelineLayout) -> Vec<Action> {
    let source_include = &config.component.include_dir;
    let config_id = key.config_id();

    match key.platform() {
        Platform::Windows => {
            let copy = |dest: &Path, patterns: &[String]| {
                Action::new("install", &config_id, &config.windows.copy_tool)
                    .arg(native(&layout.build_dir))
                    .arg(native(dest))
                    .arg("/s")
                    .args(patterns.iter().cloned())
                    .input(&layout.build_dir)
                    .output_dir(dest)
            };

            let mut actions = Vec::with_capacity(3);
            if let Some(bin_dir) = &layout.bin_dir {
                actions.push(copy(bin_dir, &config.windows.bin_patterns));
            }
            actions.push(copy(&layout.lib_dir, &config.windows.lib_patterns));
            actions.push(
                Action::new("install", &config_id, &config.windows.copy_tool)
                    .arg(native(source_include))
                    .arg(native(&layout.include_dir))
                    .arg("/s")
                    .input(&layout.build_dir)
                    .input(source_include)
                    .output_dir(&layout.include_dir),
            );
            actions
        }
        Platform::Mac | Platform::Linux => {
            let pattern = match key.platform() {
                Platform::Mac => &config.mac.lib_pattern,
                _ => &config.linux.lib_pattern,
            };
            vec![
                Action::new("install", &config_id, "find")
                    .arg(native(&layout.build_dir))
                    .args(["-name", pattern.as_str(), "-exec", "cp", "{}"])
                    .arg(native(&layout.lib_dir))
                    .arg("\\;")
                    .input(&layout.build_dir)
                    .output_dir(&layout.lib_dir),
                // `<src>/.` copies the contents, so the source directory name
                // never leaks into the install tree.
                Action::new("install", &config_id, "cp")
                    .arg("-R")
                    .arg(native(&source_include.join(".")))
                    .arg(native(&layout.include_dir))
                    .input(&layout.build_dir)
                    .input(source_include)
                    .output_dir(&layout.include_dir),
            ]
        }
    }
}

fn configure_action(
    config: &Config,
    key: &ConfigurationKey,
    environment: &PlatformEnvironment,
    layout: &PipelineLayout,
) -> Action {
    let component = &config.component;
    let installed_header = layout.install_dir.join(&component.version_header);
    let descriptor_dir = layout.install_dir.join(&config.layout.descriptor_dir);

    Action::new("cmake", key.config_id(), &config.build.configure_tool)
        .arg(format!("-DINSTALL_DIR={}", native(&descriptor_dir)))
        .arg(format!("-DSYSTEM_NAME={}", key.platform().system_name()))
        .arg(format!(
            "-D{}_VERSION_FILE={}",
            component.descriptor_prefix,
            native(&installed_header)
        ))
        .args([
            "-DINC_REL_PATH=../include",
            "-DLIB_REL_PATH=../lib",
            "-DBIN_REL_PATH=../bin",
        ])
        .arg("-P")
        .arg(native(&component.config_installer))
        .envs(&environment.env)
        .input(&layout.build_dir)
        .input(installed_header)
        .input(&component.config_installer)
        .output_file(&layout.descriptors[0])
        .output_file(&layout.descriptors[1])
}

fn package_action(config: &Config, config_id: &str, artifact: &Artifact) -> Action {
    let mut action = Action::new("pack", config_id, &config.build.archiver)
        .arg("a")
        .arg(native(&artifact.path))
        .output_file(&artifact.path);
    for entry in &artifact.entries {
        action = action
            .arg(format!("{}={}", native(&entry.source), native(&entry.dest)))
            .input(&entry.source);
    }
    action
}

/// Archive path and contents for a configuration.
///
/// The name depends only on the component id and the key, so it is the
/// same on every run.
pub fn artifact_for(config: &Config, key: &ConfigurationKey, layout: &PipelineLayout) -> Artifact {
    let file_name = format!(
        "{}.{}",
        key.archive_stem(&config.component.id),
        config.layout.archive_extension
    );

    let license = &config.component.license_file;
    let mut entries = vec![ArtifactEntry {
        source: license.clone(),
        dest: license.file_name().map(PathBuf::from).unwrap_or_else(|| license.clone()),
    }];

    for dir in layout.installed_dirs() {
        let dest = dir
            .strip_prefix(&layout.install_dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| dir.clone());
        entries.push(ArtifactEntry { source: dir, dest });
    }

    for descriptor in &layout.descriptors {
        let dest = descriptor
            .strip_prefix(&layout.install_dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| descriptor.clone());
        entries.push(ArtifactEntry {
            source: descriptor.clone(),
            dest,
        });
    }

    Artifact {
        path: config.layout.artifact_root.join(file_name),
        entries,
    }
}
