//! Textual graph parsing.
//!
//! Only quoted edge statements (`"A" -> "B"`) are recognised. Every other
//! line, including node attributes and subgraph syntax, is ignored.

use indexmap::IndexSet;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

/// Matches a quoted-source-arrow-quoted-target statement.
static EDGE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"\s*->\s*"([^"]+)""#).ok());

/// A directed edge between two node labels or addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Edge {
    /// Upstream end.
    pub source: String,
    /// Downstream end.
    pub target: String,
}

/// Graph exactly as it appears in the text, before address resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawGraph {
    /// Node labels in first-seen order.
    pub nodes: IndexSet<String>,
    /// Edges in document order.
    pub edges: Vec<Edge>,
}

/// Parser for textual graph descriptions.
#[derive(Debug, Default)]
pub struct GraphNormalizer;

impl Edge {
    /// Creates an edge.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Returns true if both ends are the same node.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

impl GraphNormalizer {
    /// Extracts every quoted edge from the text.
    ///
    /// Malformed text yields an empty or partial graph, never an error.
    #[must_use]
    pub fn parse(text: &str) -> RawGraph {
        let mut graph = RawGraph::default();
        let Some(pattern) = EDGE_PATTERN.as_ref() else {
            return graph;
        };

        for line in text.lines() {
            let Some(captures) = pattern.captures(line) else {
                continue;
            };
            let (Some(source), Some(target)) = (captures.get(1), captures.get(2)) else {
                continue;
            };

            graph.nodes.insert(source.as_str().to_string());
            graph.nodes.insert(target.as_str().to_string());
            graph.edges.push(Edge::new(source.as_str(), target.as_str()));
        }

        debug!(
            "Parsed graph text: {} nodes, {} edges",
            graph.nodes.len(),
            graph.edges.len()
        );
        graph
    }
}

impl RawGraph {
    /// Returns true if no edges were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edges() {
        let text = r#"
digraph {
    compound = "true"
    subgraph "root" {
        "[root] aws_instance.web (expand)" -> "[root] aws_vpc.main (expand)"
        "[root] aws_subnet.a (expand)" -> "[root] aws_vpc.main (expand)";
    }
}
"#;
        let graph = GraphNormalizer::parse(text);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.edges[0].source, "[root] aws_instance.web (expand)");
        assert_eq!(graph.edges[1].target, "[root] aws_vpc.main (expand)");
    }

    #[test]
    fn test_parse_without_edges_is_empty() {
        let graph = GraphNormalizer::parse("digraph {\n  node [shape = box]\n  \"lonely\"\n}");
        assert!(graph.is_empty());
        assert!(graph.nodes.is_empty());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(GraphNormalizer::parse("").is_empty());
        assert!(GraphNormalizer::parse("-> -> \"a\" ->").is_empty());
    }

    #[test]
    fn test_self_loop_is_kept() {
        let graph = GraphNormalizer::parse(r#""a" -> "a""#);
        assert_eq!(graph.edges.len(), 1);
        assert!(graph.edges[0].is_self_loop());
        assert_eq!(graph.nodes.len(), 1);
    }
}
