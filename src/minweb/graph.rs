//! Dependency graph
//!
//! A minimal directed graph where an edge `a -> b` means "a depends on b". Nodes are kept in
//! ascending order, which is also the order the topological sort scans them in, so the sort
//! is deterministic.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cycle detected")]
pub struct CycleError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph<N: Ord + Clone> {
    edges: BTreeMap<N, BTreeSet<N>>,
}

impl<N: Ord + Clone> Default for Graph<N> {
    fn default() -> Self {
        Graph {
            edges: BTreeMap::new(),
        }
    }
}

impl<N: Ord + Clone> Graph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` with no dependencies. A node that already exists loses its edges.
    pub fn add_node(&mut self, node: N) {
        self.edges.insert(node, BTreeSet::new());
    }

    /// Record that `from` depends on `to`, registering either endpoint if needed.
    pub fn add_edge(&mut self, from: N, to: N) {
        self.edges.entry(to.clone()).or_default();
        self.edges.entry(from).or_default().insert(to);
    }

    pub fn contains(&self, node: &N) -> bool {
        self.edges.contains_key(node)
    }

    pub fn dependencies(&self, node: &N) -> Option<&BTreeSet<N>> {
        self.edges.get(node)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Order the nodes so each one comes after everything it depends on.
    ///
    /// Each pass picks the first remaining node with no unmet dependencies; a pass that
    /// finds none means the remaining nodes contain a cycle.
    pub fn topological_sort(&self) -> Result<Vec<N>, CycleError> {
        let mut remaining = self.edges.clone();
        let mut sorted = Vec::with_capacity(remaining.len());
        while !remaining.is_empty() {
            let ready = remaining
                .iter()
                .find(|(_, deps)| deps.is_empty())
                .map(|(node, _)| node.clone())
                .ok_or(CycleError)?;
            remaining.remove(&ready);
            for deps in remaining.values_mut() {
                deps.remove(&ready);
            }
            sorted.push(ready);
        }
        Ok(sorted)
    }
}
