//! The compilation result and dependency registry.
//!
//! A [`CompilationResult`] owns everything discovered during one
//! compilation: the input file index, the file dependency graph built from
//! it, and every execution unit. It is passed explicitly to each plugin;
//! there is no process-wide instance.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::core::input::InputFiles;
use crate::core::unit::ExecutionUnit;
use crate::resolver::graph::DependencyGraph;

/// Read-only view of the project shared by all units during a pass.
#[derive(Debug, Clone, Copy)]
pub struct ProjectIndex<'a> {
    pub input: &'a InputFiles,
    pub graph: &'a DependencyGraph,
}

/// All resources discovered for one compilation run.
#[derive(Debug)]
pub struct CompilationResult {
    input: InputFiles,
    graph: DependencyGraph,
    units: BTreeMap<String, ExecutionUnit>,
}

impl CompilationResult {
    /// Create a result from the project's input files.
    ///
    /// The file dependency graph is built once here and stays immutable for
    /// the rest of the compilation.
    pub fn new(input: InputFiles) -> Self {
        let graph = DependencyGraph::build(&input);
        CompilationResult {
            input,
            graph,
            units: BTreeMap::new(),
        }
    }

    pub fn input(&self) -> &InputFiles {
        &self.input
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Read-only project view.
    pub fn project(&self) -> ProjectIndex<'_> {
        ProjectIndex {
            input: &self.input,
            graph: &self.graph,
        }
    }

    /// Add a unit. Returns `false` and leaves the result untouched if a unit
    /// with the same name already exists.
    pub fn add_unit(&mut self, unit: ExecutionUnit) -> bool {
        if self.units.contains_key(unit.name()) {
            return false;
        }
        self.units.insert(unit.name().to_string(), unit);
        true
    }

    pub fn unit(&self, name: &str) -> Option<&ExecutionUnit> {
        self.units.get(name)
    }

    pub fn unit_mut(&mut self, name: &str) -> Option<&mut ExecutionUnit> {
        self.units.get_mut(name)
    }

    /// Units in name order.
    pub fn units(&self) -> impl Iterator<Item = &ExecutionUnit> + '_ {
        self.units.values()
    }

    /// Split into the read-only project view and the mutable unit set.
    ///
    /// Plugins use this to mutate units while resolving against a shared,
    /// immutable file index.
    pub fn split_mut(&mut self) -> (ProjectIndex<'_>, &mut BTreeMap<String, ExecutionUnit>) {
        (
            ProjectIndex {
                input: &self.input,
                graph: &self.graph,
            },
            &mut self.units,
        )
    }

    /// Units with entrypoints that are not owned source files.
    pub fn inconsistent_units(&self) -> Vec<(&str, Vec<&str>)> {
        self.units
            .values()
            .filter_map(|u| {
                let dangling = u.unowned_entrypoints();
                (!dangling.is_empty()).then(|| (u.name(), dangling))
            })
            .collect()
    }
}

/// Key identifying a resource in the dependency registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum ResourceKey {
    Unit(String),
    Manifest(String),
    File(String),
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::Unit(name) => write!(f, "unit:{}", name),
            ResourceKey::Manifest(path) => write!(f, "manifest:{}", path),
            ResourceKey::File(path) => write!(f, "file:{}", path),
        }
    }
}

/// Directed dependency edges between resources.
#[derive(Debug, Clone, Default)]
pub struct Dependencies {
    edges: BTreeSet<(ResourceKey, ResourceKey)>,
}

impl Dependencies {
    pub fn new() -> Self {
        Dependencies::default()
    }

    /// Record that `from` depends on `to`. Returns `false` for a duplicate.
    pub fn add(&mut self, from: ResourceKey, to: ResourceKey) -> bool {
        self.edges.insert((from, to))
    }

    /// Resources `key` depends on.
    pub fn downstream<'a>(&'a self, key: &'a ResourceKey) -> impl Iterator<Item = &'a ResourceKey> + 'a {
        self.edges
            .iter()
            .filter(move |(from, _)| from == key)
            .map(|(_, to)| to)
    }

    /// Resources that depend on `key`.
    pub fn upstream<'a>(&'a self, key: &'a ResourceKey) -> impl Iterator<Item = &'a ResourceKey> + 'a {
        self.edges
            .iter()
            .filter(move |(_, to)| to == key)
            .map(|(from, _)| from)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ResourceKey, ResourceKey)> + '_ {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl Extend<(ResourceKey, ResourceKey)> for Dependencies {
    fn extend<T: IntoIterator<Item = (ResourceKey, ResourceKey)>>(&mut self, iter: T) {
        self.edges.extend(iter);
    }
}
