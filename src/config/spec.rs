//! Configuration specification types for planlens.
//!
//! This module defines the structs that map to the `planlens.yaml` file.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::plan::{DraftSet, DraftSource};

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LensConfig {
    /// Input documents.
    #[serde(default)]
    pub plan: PlanSourceConfig,
    /// Analysis behaviour.
    #[serde(default)]
    pub analysis: AnalysisSettings,
    /// Hypothetical edits applied to impact analysis.
    #[serde(default)]
    pub drafts: Vec<DraftConfig>,
}

/// Locations of the input documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanSourceConfig {
    /// Path to the plan JSON document.
    #[serde(default)]
    pub path: String,
    /// Path to the dependency graph text.
    #[serde(default)]
    pub graph: Option<String>,
    /// Path to the provider schema JSON document.
    #[serde(default)]
    pub schemas: Option<String>,
}

/// Analysis behaviour.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisSettings {
    /// Log ambiguous graph label resolutions at warn level instead of debug.
    #[serde(default)]
    pub warn_on_ambiguous_resolution: bool,
    /// Report create+delete as a replacement rather than an update.
    #[serde(default)]
    pub distinguish_replacements: bool,
    /// Stop impact traversals after this many nodes.
    #[serde(default)]
    pub max_traversal_nodes: Option<usize>,
}

/// A draft edit declared in configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftConfig {
    /// Address of the edited resource (or variable name).
    pub resource: String,
    /// Edited attribute path.
    pub attribute: String,
    /// Proposed value.
    #[serde(default)]
    pub value: Value,
    /// Value before the edit.
    #[serde(default)]
    pub old_value: Value,
    /// What the draft edits.
    #[serde(default)]
    pub source: DraftSource,
}

impl LensConfig {
    /// Builds the draft set declared by this configuration.
    #[must_use]
    pub fn draft_set(&self) -> DraftSet {
        let mut drafts = DraftSet::new();
        for draft in &self.drafts {
            drafts.add(
                draft.resource.clone(),
                draft.attribute.clone(),
                draft.old_value.clone(),
                draft.value.clone(),
                draft.source,
            );
        }
        drafts
    }
}
