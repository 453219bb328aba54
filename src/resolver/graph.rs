//! The source dependency graph.
//!
//! Nodes are project files, edges are "file A references file B" relations
//! produced by the language front ends. References that name no file in the
//! index are kept aside as dangling so the resolver can report them.

use std::collections::{BTreeMap, HashMap, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::core::input::{normalize_path, FileId, InputFiles};

/// Immutable file dependency graph for one compilation.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<FileId, ()>,
    nodes: HashMap<FileId, NodeIndex>,
    dangling: BTreeMap<FileId, Vec<String>>,
}

impl DependencyGraph {
    /// Build the graph from every source file's references.
    pub fn build(input: &InputFiles) -> Self {
        let mut graph = DependencyGraph::default();

        for (id, _) in input.iter() {
            graph.node(id);
        }

        for (id, source) in input.sources() {
            for reference in source.references() {
                match normalize_path(reference).and_then(|p| input.id_of(&p)) {
                    Some(target) => graph.add_edge(id, target),
                    None => graph
                        .dangling
                        .entry(id)
                        .or_default()
                        .push(reference.clone()),
                }
            }
        }

        tracing::debug!(
            "Built file dependency graph: {} files, {} references, {} dangling",
            graph.graph.node_count(),
            graph.graph.edge_count(),
            graph.dangling.values().map(Vec::len).sum::<usize>()
        );

        graph
    }

    fn node(&mut self, id: FileId) -> NodeIndex {
        if let Some(&node) = self.nodes.get(&id) {
            return node;
        }
        let node = self.graph.add_node(id);
        self.nodes.insert(id, node);
        node
    }

    fn add_edge(&mut self, from: FileId, to: FileId) {
        let (from, to) = (self.node(from), self.node(to));
        if !self.graph.contains_edge(from, to) {
            self.graph.add_edge(from, to, ());
        }
    }

    /// Files referenced by `id`, in id order.
    pub fn references(&self, id: FileId) -> Vec<FileId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Files that reference `id`, in id order.
    pub fn referrers(&self, id: FileId) -> Vec<FileId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: FileId, dir: Direction) -> Vec<FileId> {
        let Some(&node) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let mut out: Vec<FileId> = self
            .graph
            .neighbors_directed(node, dir)
            .map(|n| self.graph[n])
            .collect();
        out.sort();
        out
    }

    /// References from `id` that name no file in the project.
    pub fn dangling(&self, id: FileId) -> &[String] {
        self.dangling.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Shortest reference chain from any of `starts` to `target`, inclusive,
    /// stepping only through files accepted by `admit`.
    pub fn shortest_chain(
        &self,
        starts: &[FileId],
        target: FileId,
        admit: impl Fn(FileId) -> bool,
    ) -> Option<Vec<FileId>> {
        let mut prev: HashMap<FileId, Option<FileId>> = HashMap::new();
        let mut queue = VecDeque::new();

        for &start in starts {
            if prev.insert(start, None).is_none() {
                queue.push_back(start);
            }
        }

        while let Some(current) = queue.pop_front() {
            if current == target {
                let mut chain = vec![current];
                let mut cursor = current;
                while let Some(Some(p)) = prev.get(&cursor) {
                    chain.push(*p);
                    cursor = *p;
                }
                chain.reverse();
                return Some(chain);
            }
            for next in self.references(current) {
                if admit(next) && !prev.contains_key(&next) {
                    prev.insert(next, Some(current));
                    queue.push_back(next);
                }
            }
        }

        None
    }

    pub fn file_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn reference_count(&self) -> usize {
        self.graph.edge_count()
    }
}
