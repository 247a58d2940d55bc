//! Drift detection.
//!
//! Compares the declared configuration with the last recorded state, and
//! flags planned changes that imply the real resource no longer matches.

use indexmap::IndexSet;
use serde::Serialize;
use tracing::debug;

use crate::plan::{ChangePlan, RawAction};

use super::walk::{qualify, qualify_state, walk_config, walk_state};

/// Reason given for in-place updates.
pub const REASON_UPDATE: &str = "Configuration differs from state (update)";
/// Reason given for replacements.
pub const REASON_REPLACE: &str = "Resource will be replaced (replace/force)";
/// Reason given for orphaned resources.
pub const REASON_ORPHANED: &str = "Resource present in state but not in configuration (orphaned)";

/// One drift finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftEntry {
    /// Resource address.
    pub address: String,
    /// Human-readable reason.
    pub reason: String,
}

/// Result of drift analysis.
///
/// An address may appear in both lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriftResult {
    /// Resources whose planned change implies drift.
    pub drifted: Vec<DriftEntry>,
    /// Resources recorded in state with no declaring configuration block.
    pub orphaned: Vec<DriftEntry>,
}

/// Drift analyzer.
#[derive(Debug, Default)]
pub struct DriftAnalyzer;

impl DriftAnalyzer {
    /// Analyzes a plan for drift.
    #[must_use]
    pub fn analyze(plan: &ChangePlan) -> DriftResult {
        let drifted: Vec<DriftEntry> = plan
            .resource_changes
            .iter()
            .filter_map(|rc| {
                drift_reason(&rc.change.actions).map(|reason| DriftEntry {
                    address: rc.address.clone(),
                    reason: reason.to_string(),
                })
            })
            .collect();

        let declared = Self::config_addresses(plan);
        let orphaned: Vec<DriftEntry> = Self::state_addresses(plan)
            .into_iter()
            .filter(|address| !declared.contains(address))
            .map(|address| DriftEntry {
                address,
                reason: REASON_ORPHANED.to_string(),
            })
            .collect();

        debug!(
            "Drift: {} drifted, {} orphaned",
            drifted.len(),
            orphaned.len()
        );

        DriftResult { drifted, orphaned }
    }

    /// Collects every resource address declared in the configuration tree.
    #[must_use]
    pub fn config_addresses(plan: &ChangePlan) -> IndexSet<String> {
        let mut addresses = IndexSet::new();
        walk_config(plan.config_root(), |prefix, module| {
            for resource in &module.resources {
                addresses.insert(qualify(prefix, &resource.address));
            }
        });
        addresses
    }

    /// Collects every resource address recorded in the prior state.
    #[must_use]
    pub fn state_addresses(plan: &ChangePlan) -> IndexSet<String> {
        let mut addresses = IndexSet::new();
        walk_state(plan.prior_root(), |prefix, module| {
            for resource in &module.resources {
                addresses.insert(qualify_state(prefix, &resource.address));
            }
        });
        addresses
    }
}

fn drift_reason(actions: &[RawAction]) -> Option<&'static str> {
    let has = |action| actions.contains(&action);
    if has(RawAction::Update) {
        Some(REASON_UPDATE)
    } else if has(RawAction::Replace) || (has(RawAction::Create) && has(RawAction::Delete)) {
        Some(REASON_REPLACE)
    } else {
        None
    }
}

impl DriftResult {
    /// Returns true if nothing drifted and nothing is orphaned.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.drifted.is_empty() && self.orphaned.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_replace_reason() {
        let plan: ChangePlan = serde_json::from_value(json!({
            "resource_changes": [
                { "address": "X", "change": { "actions": ["create", "delete"] } },
                { "address": "Y", "change": { "actions": ["update"] } },
                { "address": "Z", "change": { "actions": ["create"] } }
            ]
        }))
        .unwrap();

        let result = DriftAnalyzer::analyze(&plan);
        assert_eq!(
            result.drifted,
            vec![
                DriftEntry { address: "X".into(), reason: REASON_REPLACE.into() },
                DriftEntry { address: "Y".into(), reason: REASON_UPDATE.into() },
            ]
        );
        assert!(result.orphaned.is_empty());
    }

    #[test]
    fn test_orphaned_across_modules() {
        let plan: ChangePlan = serde_json::from_value(json!({
            "configuration": { "root_module": {
                "resources": [{ "address": "aws_s3_bucket.logs" }],
                "module_calls": { "network": { "module": {
                    "resources": [{ "address": "aws_vpc.main" }]
                }}}
            }},
            "prior_state": { "values": { "root_module": {
                "resources": [
                    { "address": "aws_s3_bucket.logs" },
                    { "address": "aws_s3_bucket.old" }
                ],
                "child_modules": [{
                    "address": "module.network",
                    "resources": [
                        { "address": "module.network.aws_vpc.main" },
                        { "address": "aws_subnet.gone" }
                    ]
                }]
            }}}
        }))
        .unwrap();

        let orphaned: Vec<String> = DriftAnalyzer::analyze(&plan)
            .orphaned
            .into_iter()
            .map(|e| e.address)
            .collect();
        assert_eq!(
            orphaned,
            vec!["aws_s3_bucket.old", "module.network.aws_subnet.gone"]
        );
    }

    #[test]
    fn test_empty_plan_is_clean() {
        assert!(DriftAnalyzer::analyze(&ChangePlan::default()).is_clean());
    }

    #[test]
    fn test_address_in_both_lists() {
        let plan: ChangePlan = serde_json::from_value(json!({
            "resource_changes": [
                { "address": "aws_s3_bucket.old", "change": { "actions": ["update"] } }
            ],
            "prior_state": { "root_module": { "resources": [{ "address": "aws_s3_bucket.old" }] } }
        }))
        .unwrap();

        let result = DriftAnalyzer::analyze(&plan);
        assert_eq!(result.drifted.len(), 1);
        assert_eq!(result.orphaned.len(), 1);
        assert_eq!(result.orphaned[0].reason, REASON_ORPHANED);
    }
}
