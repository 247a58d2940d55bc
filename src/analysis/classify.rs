//! Change classification.
//!
//! Reduces a resource's raw action list to one effective action and counts
//! effective actions across a plan.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::plan::{ChangePlan, RawAction};

/// Effective action of a resource change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Resource will be created.
    Create,
    /// Resource will be updated (including delete-and-recreate by default).
    Update,
    /// Resource will be destroyed.
    Delete,
    /// Resource will be destroyed and recreated.
    Replace,
    /// Nothing happens.
    NoOp,
}

/// Classifier for raw action lists.
#[derive(Debug, Default)]
pub struct ChangeClassifier;

/// Effective action per plan address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionMap {
    actions: IndexMap<String, Action>,
}

/// Counts of effective actions across a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    /// Resources to create.
    pub create: usize,
    /// Resources to update (in place or by replacement).
    pub update: usize,
    /// Resources to delete.
    pub delete: usize,
    /// Resources without changes.
    pub no_change: usize,
}

impl ChangeClassifier {
    /// Classifies a raw action list.
    ///
    /// Rules, first match wins:
    /// 1. create without delete is `Create`
    /// 2. delete without create is `Delete`
    /// 3. update, or create together with delete, is `Update`
    /// 4. anything else (including no-op and empty) is `NoOp`
    #[must_use]
    pub fn classify(actions: &[RawAction]) -> Action {
        let has_create = actions.contains(&RawAction::Create);
        let has_delete = actions.contains(&RawAction::Delete);
        let has_update = actions.contains(&RawAction::Update);

        if has_create && !has_delete {
            Action::Create
        } else if has_delete && !has_create {
            Action::Delete
        } else if has_update || (has_create && has_delete) {
            Action::Update
        } else {
            Action::NoOp
        }
    }

    /// Like [`ChangeClassifier::classify`], but reports create together with
    /// delete (or an explicit replace marker) as `Replace`.
    #[must_use]
    pub fn classify_detailed(actions: &[RawAction]) -> Action {
        let replaces = actions.contains(&RawAction::Replace)
            || (actions.contains(&RawAction::Create) && actions.contains(&RawAction::Delete));
        if replaces {
            Action::Replace
        } else {
            Self::classify(actions)
        }
    }

    /// Counts effective actions across the plan.
    #[must_use]
    pub fn summarize(plan: &ChangePlan) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for change in &plan.resource_changes {
            match Self::classify(&change.change.actions) {
                Action::Create => summary.create += 1,
                Action::Delete => summary.delete += 1,
                Action::Update | Action::Replace => summary.update += 1,
                Action::NoOp => summary.no_change += 1,
            }
        }
        summary
    }
}

impl ActionMap {
    /// Builds the action map using the standard tie-break rules.
    #[must_use]
    pub fn from_plan(plan: &ChangePlan) -> Self {
        Self::build(plan, ChangeClassifier::classify)
    }

    /// Builds the action map, keeping replacements distinct from updates.
    #[must_use]
    pub fn from_plan_detailed(plan: &ChangePlan) -> Self {
        Self::build(plan, ChangeClassifier::classify_detailed)
    }

    fn build(plan: &ChangePlan, classify: fn(&[RawAction]) -> Action) -> Self {
        let actions = plan
            .resource_changes
            .iter()
            .map(|rc| (rc.address.clone(), classify(&rc.change.actions)))
            .collect();
        Self { actions }
    }

    /// Returns the action for an address, or `None` if it is not in the plan.
    #[must_use]
    pub fn get(&self, address: &str) -> Option<Action> {
        self.actions.get(address).copied()
    }

    /// Sets the action for an address.
    pub fn insert(&mut self, address: impl Into<String>, action: Action) {
        self.actions.insert(address.into(), action);
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Action)> for ActionMap {
    fn from_iter<T: IntoIterator<Item = (S, Action)>>(iter: T) -> Self {
        Self {
            actions: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl PlanSummary {
    /// Returns the number of resources with a change.
    #[must_use]
    pub const fn total_changes(&self) -> usize {
        self.create + self.update + self.delete
    }

    /// Returns true if any resource changes.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.total_changes() > 0
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Replace => "replace",
            Self::NoOp => "no-op",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to delete, {} unchanged",
            self.create, self.update, self.delete, self.no_change
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::RawAction::{Create, Delete, NoOp, Read, Update};
    use serde_json::json;

    #[test]
    fn test_tie_break_table() {
        assert_eq!(ChangeClassifier::classify(&[Create]), Action::Create);
        assert_eq!(ChangeClassifier::classify(&[Delete]), Action::Delete);
        assert_eq!(ChangeClassifier::classify(&[Update]), Action::Update);
        assert_eq!(ChangeClassifier::classify(&[Delete, Create]), Action::Update);
        assert_eq!(ChangeClassifier::classify(&[Create, Delete]), Action::Update);
        assert_eq!(ChangeClassifier::classify(&[NoOp]), Action::NoOp);
        assert_eq!(ChangeClassifier::classify(&[]), Action::NoOp);
        assert_eq!(ChangeClassifier::classify(&[Read]), Action::NoOp);
    }

    #[test]
    fn test_detailed_classification() {
        assert_eq!(ChangeClassifier::classify_detailed(&[Delete, Create]), Action::Replace);
        assert_eq!(ChangeClassifier::classify_detailed(&[RawAction::Replace]), Action::Replace);
        assert_eq!(ChangeClassifier::classify_detailed(&[Update]), Action::Update);
    }

    #[test]
    fn test_action_map_and_summary() {
        let plan: ChangePlan = serde_json::from_value(json!({
            "resource_changes": [
                { "address": "a", "change": { "actions": ["create"] } },
                { "address": "b", "change": { "actions": ["delete", "create"] } },
                { "address": "c", "change": { "actions": ["no-op"] } },
                { "address": "d", "change": { "actions": ["delete"] } }
            ]
        }))
        .unwrap();

        let map = ActionMap::from_plan(&plan);
        assert_eq!(map.len(), 4);
        assert_eq!(map.get("b"), Some(Action::Update));
        assert_eq!(map.get("missing"), None);
        assert_eq!(ActionMap::from_plan_detailed(&plan).get("b"), Some(Action::Replace));

        let summary = ChangeClassifier::summarize(&plan);
        assert_eq!(
            summary,
            PlanSummary { create: 1, update: 1, delete: 1, no_change: 1 }
        );
        assert_eq!(summary.total_changes(), 3);
    }
}
