//! Provider schema lookup.
//!
//! Provider schemas describe the attributes of each resource type. They are
//! loaded once per workspace and kept in a [`SchemaCache`] owned by the
//! caller; nothing is cached process-wide.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Provider schemas document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSchemas {
    /// Document format version.
    #[serde(default)]
    pub format_version: Option<String>,
    /// Schemas keyed by provider address.
    #[serde(default)]
    pub provider_schemas: IndexMap<String, ProviderSchema>,
}

/// Schema of one provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSchema {
    /// Resource schemas keyed by resource type.
    #[serde(default)]
    pub resource_schemas: IndexMap<String, ResourceSchema>,
    /// Data source schemas keyed by data source type.
    #[serde(default)]
    pub data_source_schemas: IndexMap<String, ResourceSchema>,
}

/// Schema of one resource type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSchema {
    /// Schema version.
    #[serde(default)]
    pub version: u64,
    /// Top-level block.
    #[serde(default)]
    pub block: SchemaBlock,
}

/// A configuration block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaBlock {
    /// Attributes keyed by name.
    #[serde(default)]
    pub attributes: IndexMap<String, SchemaAttribute>,
    /// Nested block types, kept raw.
    #[serde(default)]
    pub block_types: IndexMap<String, Value>,
}

/// A single attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct SchemaAttribute {
    /// Type expression, as emitted by the tool.
    #[serde(default, rename = "type")]
    pub attr_type: Option<Value>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Must be set.
    #[serde(default)]
    pub required: bool,
    /// May be set.
    #[serde(default)]
    pub optional: bool,
    /// Set by the provider.
    #[serde(default)]
    pub computed: bool,
    /// Value is hidden in output.
    #[serde(default)]
    pub sensitive: bool,
}

/// Per-workspace cache of provider schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaCache {
    workspaces: HashMap<String, ProviderSchemas>,
}

impl ProviderSchemas {
    /// Parses a schemas document, unwrapping a top-level `schema` envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a schemas document.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        match value {
            Value::Object(mut map) if map.contains_key("schema") => {
                serde_json::from_value(map.remove("schema").unwrap_or_default())
            }
            other => serde_json::from_value(other),
        }
    }
}

impl SchemaCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the schemas of a workspace, replacing any previous entry.
    pub fn insert(&mut self, workspace: impl Into<String>, schemas: ProviderSchemas) {
        let workspace = workspace.into();
        debug!(
            "Caching {} provider schemas for workspace {workspace}",
            schemas.provider_schemas.len()
        );
        self.workspaces.insert(workspace, schemas);
    }

    /// Returns the cached schemas of a workspace.
    #[must_use]
    pub fn get(&self, workspace: &str) -> Option<&ProviderSchemas> {
        self.workspaces.get(workspace)
    }

    /// Looks up a provider by address: exact first, then suffix either way.
    #[must_use]
    pub fn provider_schema(&self, workspace: &str, provider: &str) -> Option<&ProviderSchema> {
        let providers = &self.get(workspace)?.provider_schemas;
        providers.get(provider).or_else(|| {
            providers
                .iter()
                .find(|(key, _)| key.ends_with(provider) || provider.ends_with(key.as_str()))
                .map(|(_, schema)| schema)
        })
    }

    /// Looks up a resource type across providers in document order.
    ///
    /// Within each provider an exact key wins, then the first key matching by
    /// suffix or containment in either direction.
    #[must_use]
    pub fn resource_schema(&self, workspace: &str, resource_type: &str) -> Option<&ResourceSchema> {
        let providers = &self.get(workspace)?.provider_schemas;
        providers.values().find_map(|provider| {
            let schemas = &provider.resource_schemas;
            schemas.get(resource_type).or_else(|| {
                schemas
                    .iter()
                    .find(|(key, _)| {
                        key.contains(resource_type) || resource_type.contains(key.as_str())
                    })
                    .map(|(_, schema)| schema)
            })
        })
    }

    /// Drops one workspace. Returns true if it was cached.
    pub fn clear_workspace(&mut self, workspace: &str) -> bool {
        self.workspaces.remove(workspace).is_some()
    }

    /// Drops every workspace.
    pub fn clear_all(&mut self) {
        self.workspaces.clear();
    }

    /// Returns the number of cached workspaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }
}

impl SchemaAttribute {
    /// Short label describing how the attribute is set.
    #[must_use]
    pub const fn mode(&self) -> &'static str {
        if self.required {
            "required"
        } else if self.optional && self.computed {
            "optional+computed"
        } else if self.optional {
            "optional"
        } else if self.computed {
            "computed"
        } else {
            "-"
        }
    }
}
