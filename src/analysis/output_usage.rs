//! Output and module usage.
//!
//! Finds the configuration blocks that reference an identifier (usually a
//! module or module output), then everything downstream of them.

use indexmap::IndexSet;
use serde::Serialize;
use tracing::debug;

use crate::graph::Graph;

use super::expressions::{EntryKind, ExpressionIndex};

/// Consumers of an identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputUsageResult {
    /// The identifier searched for.
    pub identifier: String,
    /// Consuming containers that live inside a module.
    pub direct_modules: Vec<String>,
    /// Consuming root-level resources.
    pub direct_resources: Vec<String>,
    /// Resources downstream of the direct resources, excluding them.
    pub transitive_resources: Vec<String>,
}

/// Output usage analyzer.
#[derive(Debug)]
pub struct OutputUsageAnalyzer<'a> {
    index: &'a ExpressionIndex,
    graph: &'a Graph,
}

impl<'a> OutputUsageAnalyzer<'a> {
    /// Creates an analyzer over an expression index and graph.
    #[must_use]
    pub const fn new(index: &'a ExpressionIndex, graph: &'a Graph) -> Self {
        Self { index, graph }
    }

    /// Finds direct and transitive consumers of `identifier`.
    #[must_use]
    pub fn analyze(&self, identifier: &str) -> OutputUsageResult {
        let mut direct_modules = IndexSet::new();
        let mut direct_resources = IndexSet::new();

        for entry in self.index.entries() {
            if entry.kind == EntryKind::Output {
                continue;
            }
            if !entry
                .references
                .iter()
                .any(|reference| references_identifier(reference, identifier))
            {
                continue;
            }

            if entry.container.starts_with("module.") {
                direct_modules.insert(entry.container.clone());
            } else {
                direct_resources.insert(entry.container.clone());
            }
        }

        let transitive_resources: Vec<String> = self
            .graph
            .reachable_from(direct_resources.iter().map(String::as_str))
            .into_iter()
            .filter(|address| !direct_resources.contains(address))
            .collect();

        debug!(
            "Usage of {identifier}: {} module, {} resource, {} transitive",
            direct_modules.len(),
            direct_resources.len(),
            transitive_resources.len()
        );

        OutputUsageResult {
            identifier: identifier.to_string(),
            direct_modules: direct_modules.into_iter().collect(),
            direct_resources: direct_resources.into_iter().collect(),
            transitive_resources,
        }
    }
}

/// Symmetric dotted containment between a reference and an identifier.
#[must_use]
pub fn references_identifier(reference: &str, identifier: &str) -> bool {
    reference == identifier || is_dotted_child(reference, identifier) || is_dotted_child(identifier, reference)
}

fn is_dotted_child(child: &str, parent: &str) -> bool {
    child
        .strip_prefix(parent)
        .is_some_and(|rest| rest.starts_with('.'))
}

impl OutputUsageResult {
    /// Returns true if nothing references the identifier.
    #[must_use]
    pub fn is_unused(&self) -> bool {
        self.direct_modules.is_empty() && self.direct_resources.is_empty()
    }
}
