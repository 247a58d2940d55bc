//! Analysis session over one plan and graph.
//!
//! A session normalizes its inputs once (canonical graph, action map,
//! expression index) and then serves every analysis from them. It never
//! mutates the plan, so repeated calls return identical results.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::analysis::{
    ActionMap, ChangeClassifier, DriftAnalyzer, DriftResult, ExplainEngine, Explanation,
    ExpressionIndex, FlowStep, ImpactAnalyzer, ImpactResult, OutputUsageAnalyzer,
    OutputUsageResult, PlanSummary, RefactorWarning, ValueFlowAnalyzer,
};
use crate::config::{AnalysisSettings, PlanHasher};
use crate::graph::{AddressResolver, CanonicalGraph, Graph, GraphNormalizer, Resolution};
use crate::plan::{ChangePlan, DraftSet, ResourceSummary};

/// Normalized inputs and the analyses that run on them.
#[derive(Debug)]
pub struct AnalysisSession<'a> {
    /// The plan document.
    plan: &'a ChangePlan,
    /// Analysis settings.
    settings: AnalysisSettings,
    /// Addresses with draft edits.
    drafted: HashSet<String>,
    /// Canonical graph and label resolutions.
    canonical: CanonicalGraph,
    /// Effective action per plan address.
    actions: ActionMap,
    /// Expression index of the configuration.
    index: ExpressionIndex,
    /// Fingerprint of the inputs.
    fingerprint: String,
}

/// Overview of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    /// Input fingerprint.
    pub fingerprint: String,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Action counts.
    pub summary: PlanSummary,
    /// Nodes in the canonical graph.
    pub node_count: usize,
    /// Edges in the canonical graph.
    pub edge_count: usize,
    /// Graph labels that resolved to more than one candidate.
    pub ambiguous_labels: usize,
    /// Drift findings.
    pub drift: DriftResult,
}

impl<'a> AnalysisSession<'a> {
    /// Builds a session from a plan, raw graph text, settings and drafts.
    #[must_use]
    pub fn new(
        plan: &'a ChangePlan,
        graph_text: &str,
        settings: &AnalysisSettings,
        drafts: &DraftSet,
    ) -> Self {
        let raw = GraphNormalizer::parse(graph_text);
        let resolver = AddressResolver::new(plan.addresses())
            .with_ambiguity_warnings(settings.warn_on_ambiguous_resolution);
        let canonical = Graph::build_canonical(&raw, plan, &resolver);

        let actions = if settings.distinguish_replacements {
            ActionMap::from_plan_detailed(plan)
        } else {
            ActionMap::from_plan(plan)
        };

        let fingerprint = PlanHasher::new().fingerprint(plan, graph_text, settings);
        info!(
            "Session ready: {} resources, {} graph nodes, {} edges",
            actions.len(),
            canonical.graph.node_count(),
            canonical.graph.edge_count()
        );

        Self {
            plan,
            settings: *settings,
            drafted: drafts.drafted_addresses(),
            canonical,
            actions,
            index: ExpressionIndex::build(plan),
            fingerprint,
        }
    }

    /// Gets the plan.
    #[must_use]
    pub const fn plan(&self) -> &ChangePlan {
        self.plan
    }

    /// Gets the canonical graph.
    #[must_use]
    pub const fn graph(&self) -> &Graph {
        &self.canonical.graph
    }

    /// Gets the label resolutions that built the graph.
    #[must_use]
    pub fn resolutions(&self) -> &[Resolution] {
        &self.canonical.resolutions
    }

    /// Gets the action map.
    #[must_use]
    pub const fn actions(&self) -> &ActionMap {
        &self.actions
    }

    /// Gets the input fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Maps user input to a graph node.
    ///
    /// Input that already names a node is returned as is; anything else goes
    /// through the same resolution rules as graph labels.
    #[must_use]
    pub fn resolve_input(&self, input: &str) -> String {
        if self.graph().contains(input) {
            return input.to_string();
        }
        let resolved = AddressResolver::new(self.graph().nodes())
            .resolve_address(input)
            .unwrap_or_else(|| input.to_string());
        debug!("Resolved input {input} to {resolved}");
        resolved
    }

    /// Counts effective actions.
    #[must_use]
    pub fn summary(&self) -> PlanSummary {
        ChangeClassifier::summarize(self.plan)
    }

    /// Computes the downstream impact of `source`.
    #[must_use]
    pub fn impact(&self, source: &str) -> ImpactResult {
        ImpactAnalyzer::new(self.graph(), &self.actions)
            .with_drafts(&self.drafted)
            .with_node_limit(self.settings.max_traversal_nodes)
            .analyze(source)
    }

    /// Detects drift.
    #[must_use]
    pub fn drift(&self) -> DriftResult {
        DriftAnalyzer::analyze(self.plan)
    }

    /// Finds consumers of a module or output identifier.
    #[must_use]
    pub fn output_usage(&self, identifier: &str) -> OutputUsageResult {
        OutputUsageAnalyzer::new(&self.index, self.graph()).analyze(identifier)
    }

    /// Explains every node of an impact result.
    #[must_use]
    pub fn explain_impact(&self, result: &ImpactResult) -> Vec<Explanation> {
        ExplainEngine::new(&self.index, self.graph()).explain_why_for_impact(result)
    }

    /// Explains the consumers affected by a refactor warning.
    #[must_use]
    pub fn explain_refactor(&self, warning: &RefactorWarning) -> Vec<Explanation> {
        ExplainEngine::new(&self.index, self.graph()).explain_refactor_warning(warning)
    }

    /// Traces the origin of an attribute value.
    #[must_use]
    pub fn value_flow(&self, address: &str, attribute: &str) -> Vec<FlowStep> {
        ValueFlowAnalyzer::trace(self.plan, &self.index, address, attribute)
    }

    /// Summarizes one resource change.
    #[must_use]
    pub fn resource(&self, address: &str) -> Option<ResourceSummary> {
        self.plan.find_change(address).map(ResourceSummary::from_change)
    }

    /// Produces an overview report.
    #[must_use]
    pub fn report(&self) -> AnalysisReport {
        AnalysisReport {
            fingerprint: self.fingerprint.clone(),
            generated_at: Utc::now(),
            summary: self.summary(),
            node_count: self.graph().node_count(),
            edge_count: self.graph().edge_count(),
            ambiguous_labels: self
                .resolutions()
                .iter()
                .filter(|r| r.is_ambiguous())
                .count(),
            drift: self.drift(),
        }
    }
}

impl std::fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} nodes, {} edges, {} drifted, {} orphaned)",
            self.summary,
            self.node_count,
            self.edge_count,
            self.drift.drifted.len(),
            self.drift.orphaned.len()
        )
    }
}
