//! Draft (hypothetical) edits layered on top of a plan.
//!
//! Drafts never modify the plan. They only mark resources so that impact
//! analysis can flag results that depend on a pending, unapplied edit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// A single draft edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    /// Unique draft identifier.
    pub id: String,
    /// Address of the edited resource.
    pub resource_address: String,
    /// Attribute path within the resource.
    pub attribute_path: String,
    /// Value before the edit.
    pub old_value: Value,
    /// Proposed value.
    pub new_value: Value,
    /// What kind of object the draft edits.
    pub source: DraftSource,
    /// When the draft was recorded.
    pub created_at: DateTime<Utc>,
}

/// Kind of object a draft applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftSource {
    /// A resource attribute.
    #[default]
    Resource,
    /// An input variable.
    Variable,
}

/// Ordered collection of drafts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftSet {
    drafts: Vec<Draft>,
}

impl DraftSet {
    /// Creates an empty draft set.
    #[must_use]
    pub const fn new() -> Self {
        Self { drafts: Vec::new() }
    }

    /// Records a draft, replacing any existing draft for the same
    /// resource and attribute path.
    pub fn add(
        &mut self,
        resource_address: impl Into<String>,
        attribute_path: impl Into<String>,
        old_value: Value,
        new_value: Value,
        source: DraftSource,
    ) -> &Draft {
        let resource_address = resource_address.into();
        let attribute_path = attribute_path.into();

        self.drafts.retain(|d| {
            !(d.resource_address == resource_address && d.attribute_path == attribute_path)
        });

        debug!("Adding draft for {resource_address}.{attribute_path}");
        let index = self.drafts.len();
        self.drafts.push(Draft {
            id: Uuid::new_v4().to_string(),
            resource_address,
            attribute_path,
            old_value,
            new_value,
            source,
            created_at: Utc::now(),
        });
        &self.drafts[index]
    }

    /// Removes the draft with the given id. Returns true if one was removed.
    pub fn revert(&mut self, id: &str) -> bool {
        let before = self.drafts.len();
        self.drafts.retain(|d| d.id != id);
        before != self.drafts.len()
    }

    /// Removes all drafts.
    pub fn clear(&mut self) {
        self.drafts.clear();
    }

    /// Returns the drafts recorded for a resource.
    #[must_use]
    pub fn for_resource(&self, address: &str) -> Vec<&Draft> {
        self.drafts
            .iter()
            .filter(|d| d.resource_address == address)
            .collect()
    }

    /// Returns true if any draft targets the resource.
    #[must_use]
    pub fn has_draft_for(&self, address: &str) -> bool {
        self.drafts.iter().any(|d| d.resource_address == address)
    }

    /// Returns the set of addresses with at least one draft.
    #[must_use]
    pub fn drafted_addresses(&self) -> HashSet<String> {
        self.drafts
            .iter()
            .map(|d| d.resource_address.clone())
            .collect()
    }

    /// Iterates over all drafts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Draft> {
        self.drafts.iter()
    }

    /// Returns the number of drafts.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.drafts.len()
    }

    /// Returns true if there are no drafts.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_replaces_same_target() {
        let mut drafts = DraftSet::new();
        drafts.add("aws_instance.web", "instance_type", json!("t3.micro"), json!("t3.large"), DraftSource::Resource);
        drafts.add("aws_instance.web", "instance_type", json!("t3.micro"), json!("t3.xlarge"), DraftSource::Resource);
        drafts.add("aws_instance.web", "ami", json!("ami-1"), json!("ami-2"), DraftSource::Resource);

        assert_eq!(drafts.len(), 2);
        let for_web = drafts.for_resource("aws_instance.web");
        assert_eq!(for_web.len(), 2);
        assert_eq!(for_web[0].attribute_path, "instance_type");
        assert_eq!(for_web[0].new_value, json!("t3.xlarge"));
        assert_eq!(for_web[1].attribute_path, "ami");
    }

    #[test]
    fn test_revert_and_clear() {
        let mut drafts = DraftSet::new();
        let id = drafts
            .add("var.region", "value", json!("us-east-1"), json!("eu-west-1"), DraftSource::Variable)
            .id
            .clone();
        drafts.add("aws_vpc.main", "cidr_block", json!("10.0.0.0/16"), json!("10.1.0.0/16"), DraftSource::Resource);

        assert!(drafts.revert(&id));
        assert!(!drafts.revert(&id));
        assert!(!drafts.has_draft_for("var.region"));
        assert!(drafts.has_draft_for("aws_vpc.main"));

        drafts.clear();
        assert!(drafts.is_empty());
    }

    #[test]
    fn test_drafted_addresses() {
        let mut drafts = DraftSet::new();
        drafts.add("aws_vpc.main", "cidr_block", json!(null), json!("10.1.0.0/16"), DraftSource::Resource);
        drafts.add("aws_vpc.main", "tags", json!({}), json!({"env": "prod"}), DraftSource::Resource);

        let addresses = drafts.drafted_addresses();
        assert_eq!(addresses.len(), 1);
        assert!(addresses.contains("aws_vpc.main"));
    }
}
