//! Canonical dependency graph.
//!
//! The canonical graph is keyed by plan addresses. Edges are deduplicated
//! on insertion, and traversal helpers never follow self-loops.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

use crate::plan::ChangePlan;

use super::dot::{Edge, RawGraph};
use super::resolve::{AddressResolver, Resolution};

/// Directed dependency graph over canonical addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Graph {
    nodes: IndexSet<String>,
    edges: IndexSet<Edge>,
    #[serde(skip)]
    adjacency: IndexMap<String, Vec<String>>,
}

/// A canonical graph together with the label resolutions that built it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CanonicalGraph {
    /// The graph.
    pub graph: Graph,
    /// One resolution per distinct raw label, in first-seen order.
    pub resolutions: Vec<Resolution>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from edges, collapsing duplicates.
    #[must_use]
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = Edge>,
    {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    /// Builds the canonical graph from raw text edges and the plan.
    ///
    /// Each endpoint is mapped through the resolver; an edge is dropped when
    /// either end fails to resolve. Every plan address becomes a node even if
    /// the text never mentions it.
    #[must_use]
    pub fn build_canonical(
        raw: &RawGraph,
        plan: &ChangePlan,
        resolver: &AddressResolver,
    ) -> CanonicalGraph {
        let mut resolved: IndexMap<&str, Option<Resolution>> = IndexMap::new();
        for label in &raw.nodes {
            resolved
                .entry(label.as_str())
                .or_insert_with(|| resolver.resolve(label));
        }

        let address_of = |label: &str| -> Option<String> {
            resolved
                .get(label)
                .and_then(Option::as_ref)
                .map(|r| r.address.clone())
                .filter(|a| !a.is_empty())
        };

        let mut graph = Self::new();
        let mut dropped = 0usize;
        for edge in &raw.edges {
            match (address_of(&edge.source), address_of(&edge.target)) {
                (Some(source), Some(target)) => {
                    graph.add_edge(Edge::new(source, target));
                }
                _ => dropped += 1,
            }
        }

        for address in plan.addresses() {
            if !address.is_empty() {
                graph.add_node(address);
            }
        }

        debug!(
            "Canonical graph: {} nodes, {} edges ({} dropped)",
            graph.node_count(),
            graph.edge_count(),
            dropped
        );

        CanonicalGraph {
            graph,
            resolutions: resolved.into_values().flatten().collect(),
        }
    }

    /// Adds a node. Returns true if it was new.
    pub fn add_node(&mut self, address: impl Into<String>) -> bool {
        self.nodes.insert(address.into())
    }

    /// Adds an edge and its endpoints. Returns false for a duplicate edge.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if self.edges.contains(&edge) {
            return false;
        }
        self.nodes.insert(edge.source.clone());
        self.nodes.insert(edge.target.clone());
        self.adjacency
            .entry(edge.source.clone())
            .or_default()
            .push(edge.target.clone());
        self.edges.insert(edge);
        true
    }

    /// Iterates over node addresses in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    /// Iterates over edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if the node exists.
    #[must_use]
    pub fn contains(&self, address: &str) -> bool {
        self.nodes.contains(address)
    }

    /// Iterates over the direct dependents of a node, skipping self-loops.
    pub fn downstream<'a>(&'a self, address: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.adjacency
            .get(address)
            .into_iter()
            .flatten()
            .map(String::as_str)
            .filter(move |target| *target != address)
    }

    /// Finds a shortest downstream path from `from` to `to`, both included.
    #[must_use]
    pub fn shortest_path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        let mut parent: HashMap<&str, Option<&str>> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        parent.insert(from, None);

        while let Some(current) = queue.pop_front() {
            if current == to {
                let mut path = vec![current.to_string()];
                let mut node = current;
                while let Some(Some(prev)) = parent.get(node) {
                    path.push((*prev).to_string());
                    node = *prev;
                }
                path.reverse();
                return Some(path);
            }
            for target in self.downstream(current) {
                if !parent.contains_key(target) {
                    parent.insert(target, Some(current));
                    queue.push_back(target);
                }
            }
        }

        None
    }

    /// Collects every node reachable from any of `sources`, excluding the
    /// sources themselves, in breadth-first order.
    #[must_use]
    pub fn reachable_from<'a, I>(&self, sources: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue = VecDeque::new();
        for source in sources {
            if visited.insert(source) {
                queue.push_back(source);
            }
        }

        let mut reached = Vec::new();
        while let Some(current) = queue.pop_front() {
            for target in self.downstream(current) {
                if visited.insert(target) {
                    reached.push(target.to_string());
                    queue.push_back(target);
                }
            }
        }
        reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphNormalizer;
    use serde_json::json;

    fn chain() -> Graph {
        Graph::from_edges([
            Edge::new("a", "b"),
            Edge::new("b", "c"),
            Edge::new("a", "d"),
            Edge::new("d", "c"),
            Edge::new("a", "b"),
            Edge::new("c", "c"),
        ])
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let graph = chain();
        assert_eq!(graph.edge_count(), 5);
        assert_eq!(graph.node_count(), 4);
    }

    #[test]
    fn test_downstream_skips_self_loop() {
        let graph = chain();
        assert_eq!(graph.downstream("a").collect::<Vec<_>>(), vec!["b", "d"]);
        assert_eq!(graph.downstream("c").count(), 0);
        assert_eq!(graph.downstream("missing").count(), 0);
    }

    #[test]
    fn test_shortest_path() {
        let graph = chain();
        assert_eq!(
            graph.shortest_path("a", "c"),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert_eq!(graph.shortest_path("c", "a"), None);
        assert_eq!(graph.shortest_path("a", "a"), Some(vec!["a".to_string()]));
    }

    #[test]
    fn test_reachable_from_multiple_sources() {
        let graph = Graph::from_edges([
            Edge::new("x", "y"),
            Edge::new("y", "z"),
            Edge::new("w", "y"),
        ]);
        assert_eq!(graph.reachable_from(["x", "w"]), vec!["y", "z"]);
        assert_eq!(graph.reachable_from(["x", "y"]), vec!["z"]);
    }

    #[test]
    fn test_build_canonical_includes_isolated_plan_resources() {
        let plan: ChangePlan = serde_json::from_value(json!({
            "resource_changes": [
                { "address": "aws_vpc.main", "change": { "actions": ["create"] } },
                { "address": "aws_subnet.a", "change": { "actions": ["create"] } },
                { "address": "aws_s3_bucket.logs", "change": { "actions": ["no-op"] } }
            ]
        }))
        .unwrap();
        let raw = GraphNormalizer::parse(
            "\"[root] aws_subnet.a (expand)\" -> \"[root] aws_vpc.main (expand)\"\n\
             \"[root] aws_subnet.a (expand)\" -> \"[root] provider[\\\"aws\\\"]\"",
        );
        let resolver = AddressResolver::new(plan.addresses());
        let canonical = Graph::build_canonical(&raw, &plan, &resolver);

        let graph = &canonical.graph;
        assert!(graph.contains("aws_s3_bucket.logs"));
        assert!(graph
            .edges()
            .any(|e| e.source == "aws_subnet.a" && e.target == "aws_vpc.main"));
        assert_eq!(canonical.resolutions.len(), 3);
    }
}
