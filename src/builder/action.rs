//! Declared actions and the action graph handed to the execution backend.
//!
//! Actions are pure declarations: a command line, an environment, and the
//! paths they read and write. Dependency edges are never stated directly;
//! they are derived from declared paths, so an action that forgets an input
//! simply has no edge and the backend may schedule it too early.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::core::error::PlanError;
use crate::util::hash::Fingerprint;

/// One declared command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Action kind (e.g. "make", "install", "cmake", "pack")
    pub name: String,
    /// Configuration the action belongs to
    pub config_id: String,
    /// The program to run
    pub program: String,
    /// Command arguments
    pub args: Vec<String>,
    /// Environment variables to set
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Files and directories read
    pub inputs: Vec<PathBuf>,
    /// Files written
    #[serde(default)]
    pub output_files: Vec<PathBuf>,
    /// Directories written (directory granularity)
    #[serde(default)]
    pub output_dirs: Vec<PathBuf>,
    /// Must not run alongside other actions; it manages its own workers
    #[serde(default)]
    pub exclusive: bool,
}

impl Action {
    /// Create a new action.
    pub fn new(name: impl Into<String>, config_id: impl Into<String>, program: impl Into<String>) -> Self {
        Action {
            name: name.into(),
            config_id: config_id.into(),
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            inputs: Vec::new(),
            output_files: Vec::new(),
            output_dirs: Vec::new(),
            exclusive: false,
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Set the whole environment.
    pub fn envs(mut self, env: &BTreeMap<String, String>) -> Self {
        self.env = env.clone();
        self
    }

    /// Add a declared input.
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.inputs.push(path.into());
        self
    }

    /// Add multiple declared inputs.
    pub fn inputs(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.inputs.extend(paths.into_iter().map(|p| p.into()));
        self
    }

    /// Add a declared output file.
    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_files.push(path.into());
        self
    }

    /// Add a declared output directory.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dirs.push(path.into());
        self
    }

    /// Mark the action as exclusive.
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Full argv: program followed by arguments.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Every declared output, files first.
    pub fn outputs(&self) -> impl Iterator<Item = &PathBuf> {
        self.output_files.iter().chain(&self.output_dirs)
    }

    /// Whether reading `path` depends on something this action writes.
    ///
    /// Directories overlap in both directions: reading a file inside an
    /// output directory, or reading a directory that contains an output.
    pub fn produces(&self, path: &Path) -> bool {
        self.output_files
            .iter()
            .any(|f| f == path || f.starts_with(path))
            || self
                .output_dirs
                .iter()
                .any(|d| path.starts_with(d) || d.starts_with(path))
    }
}

/// All actions of one planning run plus the named aggregate targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionGraph {
    /// Actions in declaration order
    pub actions: Vec<Action>,
    /// Alias name -> declared output paths it stands for
    pub aliases: BTreeMap<String, Vec<PathBuf>>,
}

impl ActionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action and return its index.
    pub fn add_action(&mut self, action: Action) -> usize {
        tracing::trace!("declare {} [{}]", action.name, action.argv().join(" "));
        self.actions.push(action);
        self.actions.len() - 1
    }

    /// Register (or extend) an alias.
    pub fn add_alias(&mut self, name: impl Into<String>, paths: impl IntoIterator<Item = PathBuf>) {
        self.aliases.entry(name.into()).or_default().extend(paths);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Dependency graph: an edge `a -> b` means `b` reads what `a` writes.
    pub fn dependency_graph(&self) -> DiGraph<usize, ()> {
        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..self.actions.len()).map(|i| graph.add_node(i)).collect();

        for (consumer, action) in self.actions.iter().enumerate() {
            for (producer, candidate) in self.actions.iter().enumerate() {
                if producer == consumer {
                    continue;
                }
                if action.inputs.iter().any(|input| candidate.produces(input)) {
                    graph.update_edge(nodes[producer], nodes[consumer], ());
                }
            }
        }

        graph
    }

    /// Action indices in an order where producers precede consumers.
    pub fn topological_order(&self) -> Result<Vec<usize>, PlanError> {
        let graph = self.dependency_graph();
        toposort(&graph, None)
            .map(|order| order.into_iter().map(|n| graph[n]).collect())
            .map_err(|cycle| PlanError::GraphCycle {
                action: self.actions[graph[cycle.node_id()]].name.clone(),
            })
    }

    /// The sub-graph needed to produce the given aliases.
    ///
    /// Keeps every action that writes an alias path plus everything those
    /// actions transitively read from; declaration order is preserved.
    pub fn select(&self, aliases: &[String]) -> Result<ActionGraph, PlanError> {
        let graph = self.dependency_graph();
        let mut keep: BTreeSet<usize> = BTreeSet::new();
        let mut stack: Vec<NodeIndex> = Vec::new();
        let mut selected_aliases = BTreeMap::new();

        for alias in aliases {
            let paths = self
                .aliases
                .get(alias)
                .ok_or_else(|| PlanError::UnknownAlias {
                    alias: alias.clone(),
                })?;
            selected_aliases.insert(alias.clone(), paths.clone());

            for (index, action) in self.actions.iter().enumerate() {
                if paths.iter().any(|p| action.produces(p)) {
                    stack.push(NodeIndex::new(index));
                }
            }
        }

        while let Some(node) = stack.pop() {
            if keep.insert(graph[node]) {
                stack.extend(graph.neighbors_directed(node, Direction::Incoming));
            }
        }

        Ok(ActionGraph {
            actions: keep.into_iter().map(|i| self.actions[i].clone()).collect(),
            aliases: selected_aliases,
        })
    }

    /// Stable fingerprint of every declaration in the graph.
    ///
    /// Identical planning inputs give identical fingerprints, which lets the
    /// backend reuse cached results across runs.
    pub fn fingerprint(&self) -> String {
        let mut fp = Fingerprint::new();
        for action in &self.actions {
            fp.update_str(&action.name)
                .update_str(&action.config_id)
                .update_strs(action.argv().iter().map(String::as_str))
                .update_strs(action.env.iter().flat_map(|(k, v)| [k.as_str(), v.as_str()]))
                .update_bool(action.exclusive);
            for list in [&action.inputs, &action.output_files, &action.output_dirs] {
                fp.update_str(&list.len().to_string());
                for path in list {
                    fp.update_path(path);
                }
            }
        }
        for (name, paths) in &self.aliases {
            fp.update_str(name);
            for path in paths {
                fp.update_path(path);
            }
        }
        fp.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> ActionGraph {
        let mut graph = ActionGraph::new();
        graph.add_action(
            Action::new("pack", "c", "7z-pack")
                .input("out/lib")
                .output_file("artifacts/c.7z"),
        );
        graph.add_action(
            Action::new("install", "c", "cp")
                .input("build/c")
                .output_dir("out/lib"),
        );
        graph.add_action(
            Action::new("make", "c", "make")
                .input("/toolchain/bin")
                .output_dir("build/c")
                .exclusive(),
        );
        graph.add_alias("lib::c", vec![PathBuf::from("out/lib")]);
        graph.add_alias("buildzip::c", vec![PathBuf::from("artifacts/c.7z")]);
        graph
    }

    #[test]
    fn test_action_builder() {
        let action = Action::new("make", "linux_intel64", "make")
            .arg("cfg=release")
            .args(["-j", "8"])
            .input("/sdk")
            .output_dir("build/x");

        assert_eq!(action.argv(), vec!["make", "cfg=release", "-j", "8"]);
        assert_eq!(action.outputs().count(), 1);
        assert!(!action.exclusive);
    }

    #[test]
    fn test_produces_matches_directories_both_ways() {
        let install = Action::new("install", "c", "cp").output_dir("builds/c/include");
        assert!(install.produces(Path::new("builds/c/include/tbb/tbb_stddef.h")));
        assert!(install.produces(Path::new("builds/c")));
        assert!(!install.produces(Path::new("builds/c/lib")));

        let configure = Action::new("cmake", "c", "cmake").output_file("builds/c/cmake/A.cmake");
        assert!(configure.produces(Path::new("builds/c/cmake/A.cmake")));
        assert!(!configure.produces(Path::new("builds/c/cmake/B.cmake")));
    }

    #[test]
    fn test_topological_order() {
        let graph = chain();
        let order = graph.topological_order().unwrap();
        let names: Vec<&str> = order.iter().map(|&i| graph.actions[i].name.as_str()).collect();
        assert_eq!(names, vec!["make", "install", "pack"]);
    }

    #[test]
    fn test_cycle_detected() {
        let mut graph = ActionGraph::new();
        graph.add_action(Action::new("a", "c", "x").input("b").output_file("a"));
        graph.add_action(Action::new("b", "c", "x").input("a").output_file("b"));

        let err = graph.topological_order().unwrap_err();
        assert!(matches!(err, PlanError::GraphCycle { .. }));
    }

    #[test]
    fn test_select_alias() {
        let graph = chain();

        let lib = graph.select(&["lib::c".to_string()]).unwrap();
        assert_eq!(lib.len(), 2);
        assert!(lib.actions.iter().all(|a| a.name != "pack"));
        assert_eq!(lib.aliases.len(), 1);

        let zip = graph.select(&["buildzip::c".to_string()]).unwrap();
        assert_eq!(zip.len(), 3);

        let err = graph.select(&["nope".to_string()]).unwrap_err();
        assert!(matches!(err, PlanError::UnknownAlias { .. }));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(chain().fingerprint(), chain().fingerprint());

        let mut changed = chain();
        changed.actions[2].args.push("-j 4".to_string());
        assert_ne!(chain().fingerprint(), changed.fingerprint());
    }

    #[test]
    fn test_graph_json_roundtrip() {
        let graph = chain();
        let json = serde_json::to_string(&graph).unwrap();
        let back: ActionGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(back, graph);
    }
}
