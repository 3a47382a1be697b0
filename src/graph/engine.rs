//! The dependency graph for one classpath view.
//!
//! Uses petgraph to store "pulled in by" relationships from the `parents`
//! metadata and answers which direct dependencies lead to a transitive one.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Reversed};
use std::collections::{BTreeSet, HashMap, VecDeque};
use tracing::debug;

use super::types::{ArtifactIdentity, Declaration, ResolvedArtifact};

/// Directed graph of artifacts; an edge `P -> C` means `P` pulled in `C`.
pub struct DependencyGraph {
    graph: DiGraph<ArtifactIdentity, ()>,
    nodes: HashMap<ArtifactIdentity, NodeIndex>,
    direct: BTreeSet<ArtifactIdentity>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            nodes: HashMap::new(),
            direct: BTreeSet::new(),
        }
    }

    /// Build from a resolved view. Parents that are not themselves in the
    /// view still become nodes so paths through them are kept.
    pub fn from_resolved(artifacts: &[ResolvedArtifact]) -> Self {
        let mut graph = Self::new();
        for artifact in artifacts {
            graph.add_artifact(&artifact.identity, artifact.declaration);
        }
        for artifact in artifacts {
            for parent in &artifact.parents {
                graph.add_edge(parent, &artifact.identity);
            }
        }
        debug!(
            node_count = graph.graph.node_count(),
            edge_count = graph.graph.edge_count(),
            "built dependency graph"
        );
        graph
    }

    // ─── Node Operations ────────────────────────────────────────

    fn node(&mut self, identity: &ArtifactIdentity) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(identity) {
            return idx;
        }
        let idx = self.graph.add_node(identity.clone());
        self.nodes.insert(identity.clone(), idx);
        idx
    }

    pub fn add_artifact(&mut self, identity: &ArtifactIdentity, declaration: Declaration) {
        self.node(identity);
        if declaration == Declaration::Direct {
            self.direct.insert(identity.clone());
        }
    }

    // ─── Edge Operations ────────────────────────────────────────

    pub fn add_edge(&mut self, parent: &ArtifactIdentity, child: &ArtifactIdentity) {
        let from = self.node(parent);
        let to = self.node(child);
        if from != to && self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, ());
        }
    }

    // ─── Query Operations ───────────────────────────────────────

    /// Direct dependencies from which `target` is reachable, sorted by
    /// canonical identity. Empty when no parent metadata leads to it.
    pub fn via(&self, target: &ArtifactIdentity) -> Vec<ArtifactIdentity> {
        let Some(&start) = self.nodes.get(target) else {
            return Vec::new();
        };
        let reversed = Reversed(&self.graph);
        let mut bfs = Bfs::new(reversed, start);
        let mut found = Vec::new();
        while let Some(idx) = bfs.next(reversed) {
            let identity = &self.graph[idx];
            if idx != start && self.direct.contains(identity) {
                found.push(identity.clone());
            }
        }
        found.sort_by_key(ArtifactIdentity::canonical);
        found
    }

    /// Shortest chain from a direct dependency down to `target`, inclusive
    /// at both ends. Ties go to the direct dependency that sorts first.
    pub fn path_to(&self, target: &ArtifactIdentity) -> Option<Vec<ArtifactIdentity>> {
        let &start = self.nodes.get(target)?;
        let mut previous: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        let mut hits: Vec<NodeIndex> = Vec::new();
        let mut depth_of: HashMap<NodeIndex, usize> = HashMap::from([(start, 0)]);
        let mut hit_depth = None;

        while let Some(idx) = queue.pop_front() {
            let depth = depth_of[&idx];
            if hit_depth.is_some_and(|d| depth > d) {
                break;
            }
            if idx != start && self.direct.contains(&self.graph[idx]) {
                hit_depth = Some(depth);
                hits.push(idx);
                continue;
            }
            for parent in self
                .graph
                .neighbors_directed(idx, petgraph::Direction::Incoming)
            {
                if !depth_of.contains_key(&parent) {
                    depth_of.insert(parent, depth + 1);
                    previous.insert(parent, idx);
                    queue.push_back(parent);
                }
            }
        }

        let first = hits
            .into_iter()
            .min_by_key(|idx| self.graph[*idx].canonical())?;
        let mut chain = vec![self.graph[first].clone()];
        let mut cursor = first;
        while let Some(&next) = previous.get(&cursor) {
            chain.push(self.graph[next].clone());
            cursor = next;
        }
        Some(chain)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
