//! Blast-radius analysis.
//!
//! Breadth-first traversal downstream from a chosen source, annotating each
//! reached resource with its distance, planned action, draft status and
//! severity warnings.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::{debug, warn};

use crate::graph::Graph;

use super::classify::{Action, ActionMap};

/// Warning for resources touched by a draft edit.
pub const WARN_DRAFT: &str = "Based on draft change";
/// Warning for deletions.
pub const WARN_DESTRUCTIVE: &str = "Destructive change";
/// Warning for deletions of indirect dependents.
pub const WARN_FORCED_DELETION: &str = "Forced deletion of dependent resource";
/// Warning for replacements.
pub const WARN_REPLACEMENT: &str = "Resource replacement";
/// Warning for replacements of indirect dependents.
pub const WARN_FORCED_REPLACEMENT: &str = "Forced replacement of dependent resource";
/// Warning for updates of indirect dependents.
pub const WARN_TRIGGERED_UPDATE: &str = "Triggered update";

/// A resource reached by impact analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactNode {
    /// Resource address.
    pub address: String,
    /// Shortest distance from the source (at least 1).
    pub depth: usize,
    /// Planned action, if the resource is in the plan.
    pub action: Option<Action>,
    /// Whether a draft edit targets this resource.
    pub has_draft: bool,
    /// Severity warnings.
    pub warnings: Vec<String>,
}

/// Result of an impact analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactResult {
    /// The source address, as given.
    pub source: String,
    /// Depth-1 dependents.
    pub direct: Vec<ImpactNode>,
    /// Dependents at depth 2 or more, ordered by depth.
    pub transitive: Vec<ImpactNode>,
    /// `direct` followed by `transitive`.
    pub all: Vec<ImpactNode>,
    /// True if a node budget cut the traversal short.
    pub truncated: bool,
}

/// How a node relates to an impact result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactClass {
    /// The analysis source.
    Source,
    /// A depth-1 dependent.
    Direct,
    /// A deeper dependent.
    Transitive,
    /// Not affected.
    None,
}

/// Downstream impact analyzer.
#[derive(Debug)]
pub struct ImpactAnalyzer<'a> {
    graph: &'a Graph,
    actions: &'a ActionMap,
    drafted: Option<&'a HashSet<String>>,
    node_limit: Option<usize>,
}

impl<'a> ImpactAnalyzer<'a> {
    /// Creates an analyzer over a graph and action map.
    #[must_use]
    pub const fn new(graph: &'a Graph, actions: &'a ActionMap) -> Self {
        Self {
            graph,
            actions,
            drafted: None,
            node_limit: None,
        }
    }

    /// Sets the addresses that carry draft edits.
    #[must_use]
    pub const fn with_drafts(mut self, drafted: &'a HashSet<String>) -> Self {
        self.drafted = Some(drafted);
        self
    }

    /// Stops the traversal after this many impacted nodes.
    #[must_use]
    pub const fn with_node_limit(mut self, limit: Option<usize>) -> Self {
        self.node_limit = limit;
        self
    }

    /// Computes the downstream impact of `source`.
    ///
    /// The source itself is never part of the result. A source that is not
    /// in the graph, or has no dependents, yields empty lists.
    #[must_use]
    pub fn analyze(&self, source: &str) -> ImpactResult {
        let mut visited: HashSet<&str> = HashSet::from([source]);
        let mut by_depth: BTreeMap<usize, Vec<ImpactNode>> = BTreeMap::new();
        let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(source, 0)]);
        let mut reached = 0usize;
        let mut truncated = false;

        'traversal: while let Some((address, depth)) = queue.pop_front() {
            for target in self.graph.downstream(address) {
                if !visited.insert(target) {
                    continue;
                }
                if self.node_limit.is_some_and(|limit| reached >= limit) {
                    truncated = true;
                    break 'traversal;
                }

                let next_depth = depth + 1;
                by_depth
                    .entry(next_depth)
                    .or_default()
                    .push(self.impact_node(target, next_depth));
                reached += 1;
                queue.push_back((target, next_depth));
            }
        }

        if truncated {
            warn!("Impact analysis from {source} stopped after {reached} nodes");
        }

        let direct = by_depth.remove(&1).unwrap_or_default();
        let transitive: Vec<ImpactNode> = by_depth.into_values().flatten().collect();
        let all = direct.iter().chain(&transitive).cloned().collect();

        debug!(
            "Impact of {source}: {} direct, {} transitive",
            direct.len(),
            transitive.len()
        );

        ImpactResult {
            source: source.to_string(),
            direct,
            transitive,
            all,
            truncated,
        }
    }

    fn impact_node(&self, address: &str, depth: usize) -> ImpactNode {
        let action = self.actions.get(address);
        let has_draft = self.drafted.is_some_and(|d| d.contains(address));
        ImpactNode {
            address: address.to_string(),
            depth,
            action,
            has_draft,
            warnings: severity_warnings(action, depth, has_draft),
        }
    }
}

/// Computes severity warnings for a reached resource.
#[must_use]
pub fn severity_warnings(action: Option<Action>, depth: usize, has_draft: bool) -> Vec<String> {
    let mut warnings = Vec::new();
    let indirect = depth > 1;

    if has_draft {
        warnings.push(WARN_DRAFT.to_string());
    }

    match action {
        Some(Action::Delete) => {
            warnings.push(WARN_DESTRUCTIVE.to_string());
            if indirect {
                warnings.push(WARN_FORCED_DELETION.to_string());
            }
        }
        Some(Action::Replace) => {
            warnings.push(WARN_REPLACEMENT.to_string());
            if indirect {
                warnings.push(WARN_FORCED_REPLACEMENT.to_string());
            }
        }
        Some(Action::Update) if indirect => {
            warnings.push(WARN_TRIGGERED_UPDATE.to_string());
        }
        _ => {}
    }

    warnings
}

impl ImpactResult {
    /// Returns true if nothing downstream is affected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Classifies a node relative to this result.
    #[must_use]
    pub fn class_of(&self, address: &str) -> ImpactClass {
        if address == self.source {
            ImpactClass::Source
        } else if self.direct.iter().any(|n| n.address == address) {
            ImpactClass::Direct
        } else if self.transitive.iter().any(|n| n.address == address) {
            ImpactClass::Transitive
        } else {
            ImpactClass::None
        }
    }

    /// Returns the impacted node for an address, if any.
    #[must_use]
    pub fn node(&self, address: &str) -> Option<&ImpactNode> {
        self.all.iter().find(|n| n.address == address)
    }
}

/// Classifies a node against an optional impact result.
#[must_use]
pub fn impact_class(address: &str, result: Option<&ImpactResult>) -> ImpactClass {
    result.map_or(ImpactClass::None, |r| r.class_of(address))
}

impl std::fmt::Display for ImpactClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Source => "source",
            Self::Direct => "direct",
            Self::Transitive => "transitive",
            Self::None => "none",
        };
        write!(f, "{s}")
    }
}
