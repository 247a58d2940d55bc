//! Expression index.
//!
//! A flat list of `{container, attribute, references}` entries derived from
//! the configuration tree, used for attribute-level provenance lookups.

use serde::Serialize;

use crate::plan::ChangePlan;

use super::walk::{qualify, walk_config};

/// Kind of container an index entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A resource attribute expression.
    Resource,
    /// A module output value expression.
    Output,
}

/// One attribute (or output) expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    /// Fully qualified container address (`output.<name>` for outputs).
    pub container: String,
    /// Attribute name, or the output name.
    pub attribute: String,
    /// What the container is.
    pub kind: EntryKind,
    /// References exposed by the expression.
    pub references: Vec<String>,
}

/// Flattened expression entries of a configuration tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpressionIndex {
    entries: Vec<IndexEntry>,
}

impl ExpressionIndex {
    /// Builds the index from the plan's configuration.
    ///
    /// Within each module, resource entries come first (per resource, in
    /// attribute order), then outputs, then child modules.
    #[must_use]
    pub fn build(plan: &ChangePlan) -> Self {
        let mut entries = Vec::new();

        walk_config(plan.config_root(), |prefix, module| {
            for resource in &module.resources {
                let container = qualify(prefix, &resource.address);
                for (attribute, expression) in &resource.expressions {
                    entries.push(IndexEntry {
                        container: container.clone(),
                        attribute: attribute.clone(),
                        kind: EntryKind::Resource,
                        references: expression.references.clone(),
                    });
                }
            }

            for (name, output) in &module.outputs {
                if let Some(expression) = &output.expression {
                    entries.push(IndexEntry {
                        container: qualify(prefix, &format!("output.{name}")),
                        attribute: name.clone(),
                        kind: EntryKind::Output,
                        references: expression.references.clone(),
                    });
                }
            }
        });

        Self { entries }
    }

    /// Iterates over all entries.
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    /// Iterates over resource entries only.
    pub fn resource_entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::Resource)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IndexEntry {
    /// Returns true if the container address matches `address` exactly or
    /// as a suffix in either direction.
    #[must_use]
    pub fn container_matches(&self, address: &str) -> bool {
        self.container == address
            || self.container.ends_with(address)
            || address.ends_with(self.container.as_str())
    }
}
