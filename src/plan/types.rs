//! Change-plan document types.
//!
//! These types map the JSON plan document produced by the provisioning
//! tool. Every section is optional and defaults to empty, so a partial
//! document still yields a usable (if sparse) plan.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A complete change-plan document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangePlan {
    /// Plan format version reported by the tool.
    #[serde(default)]
    pub format_version: Option<String>,
    /// Version of the tool that produced the plan.
    #[serde(default)]
    pub terraform_version: Option<String>,
    /// Planned changes, in document order.
    #[serde(default)]
    pub resource_changes: Vec<ResourceChange>,
    /// Declared configuration tree.
    #[serde(default)]
    pub configuration: Option<Configuration>,
    /// Last-known applied state.
    #[serde(default, alias = "state")]
    pub prior_state: Option<PriorState>,
}

/// A single planned resource change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceChange {
    /// Full resource address.
    #[serde(default)]
    pub address: String,
    /// The change itself.
    #[serde(default)]
    pub change: Change,
}

/// Raw action list and before/after values of a change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Change {
    /// Raw actions, as reported by the tool.
    #[serde(default)]
    pub actions: Vec<RawAction>,
    /// Attribute values before the change.
    #[serde(default)]
    pub before: Option<Value>,
    /// Attribute values after the change.
    #[serde(default)]
    pub after: Option<Value>,
}

/// A raw change action as it appears in the plan document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RawAction {
    /// Resource will be created.
    Create,
    /// Data source will be read.
    Read,
    /// Resource will be updated in place.
    Update,
    /// Resource will be destroyed.
    Delete,
    /// Nothing happens.
    NoOp,
    /// Explicit replacement marker.
    Replace,
    /// Any action this tool does not know about.
    #[serde(other)]
    Other,
}

/// Declared configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Root module of the configuration tree.
    #[serde(default)]
    pub root_module: Option<ConfigModule>,
}

/// A configuration module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigModule {
    /// Resources declared directly in this module.
    #[serde(default)]
    pub resources: Vec<ConfigResource>,
    /// Module outputs by name.
    #[serde(default)]
    pub outputs: IndexMap<String, ConfigOutput>,
    /// Child module calls by call name.
    #[serde(default)]
    pub module_calls: IndexMap<String, ModuleCall>,
}

/// A resource block in the configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigResource {
    /// Address relative to the declaring module.
    #[serde(default)]
    pub address: String,
    /// Attribute expressions by attribute name.
    #[serde(default)]
    pub expressions: IndexMap<String, Expression>,
}

/// A module output declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigOutput {
    /// The output value expression.
    #[serde(default, alias = "value")]
    pub expression: Option<Expression>,
}

/// A call to a child module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleCall {
    /// The called module's configuration.
    #[serde(default)]
    pub module: Option<ConfigModule>,
}

/// An attribute expression, reduced to the references it exposes.
///
/// Any JSON value deserializes: nested blocks and constants without a
/// `references` array yield an empty list, and non-string entries are
/// skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Expression {
    /// Referenced addresses and attribute paths.
    pub references: Vec<String>,
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        let references = value
            .get("references")
            .and_then(Value::as_array)
            .map(|refs| {
                refs.iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        Self { references }
    }
}

/// Prior (last applied) state.
///
/// Accepts both the nested `values.root_module` shape and a bare
/// `root_module`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorState {
    /// Nested state values.
    #[serde(default)]
    pub values: Option<StateValues>,
    /// Root module given directly.
    #[serde(default)]
    pub root_module: Option<StateModule>,
}

/// The `values` section of a state document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateValues {
    /// Root module of the state tree.
    #[serde(default)]
    pub root_module: Option<StateModule>,
}

/// A module in the recorded state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateModule {
    /// The module's own address (absent for the root module).
    #[serde(default)]
    pub address: Option<String>,
    /// Resources recorded in this module.
    #[serde(default)]
    pub resources: Vec<StateResource>,
    /// Child modules.
    #[serde(default)]
    pub child_modules: Vec<StateModule>,
}

/// A resource recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateResource {
    /// Resource address.
    #[serde(default)]
    pub address: String,
}

impl ChangePlan {
    /// Returns every address in `resource_changes`, in document order.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.resource_changes.iter().map(|rc| rc.address.as_str())
    }

    /// Finds the change entry for an address.
    #[must_use]
    pub fn find_change(&self, address: &str) -> Option<&ResourceChange> {
        self.resource_changes.iter().find(|rc| rc.address == address)
    }

    /// Returns the root configuration module, if any.
    #[must_use]
    pub fn config_root(&self) -> Option<&ConfigModule> {
        self.configuration.as_ref()?.root_module.as_ref()
    }

    /// Returns the root module of the prior state, if any.
    #[must_use]
    pub fn prior_root(&self) -> Option<&StateModule> {
        self.prior_state.as_ref()?.root_module()
    }
}

impl Change {
    /// Returns true if the raw action list contains the given action.
    #[must_use]
    pub fn has(&self, action: RawAction) -> bool {
        self.actions.contains(&action)
    }
}

impl PriorState {
    /// Returns the root module from whichever shape the document used.
    #[must_use]
    pub fn root_module(&self) -> Option<&StateModule> {
        self.root_module
            .as_ref()
            .or_else(|| self.values.as_ref()?.root_module.as_ref())
    }
}

impl std::fmt::Display for RawAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::NoOp => "no-op",
            Self::Replace => "replace",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_empty_document() {
        let plan: ChangePlan = serde_json::from_value(json!({})).unwrap();
        assert!(plan.resource_changes.is_empty());
        assert!(plan.config_root().is_none());
        assert!(plan.prior_root().is_none());
    }

    #[test]
    fn test_parse_actions_and_unknown_action() {
        let plan: ChangePlan = serde_json::from_value(json!({
            "resource_changes": [
                { "address": "aws_instance.web", "change": { "actions": ["delete", "create"] } },
                { "address": "data.aws_ami.ubuntu", "change": { "actions": ["read", "forget"] } }
            ]
        }))
        .unwrap();

        assert_eq!(
            plan.resource_changes[0].change.actions,
            vec![RawAction::Delete, RawAction::Create]
        );
        assert_eq!(
            plan.resource_changes[1].change.actions,
            vec![RawAction::Read, RawAction::Other]
        );
    }

    #[test]
    fn test_expression_references_are_lenient() {
        let plan: ChangePlan = serde_json::from_value(json!({
            "configuration": { "root_module": { "resources": [{
                "address": "aws_instance.web",
                "expressions": {
                    "ami": { "references": ["data.aws_ami.ubuntu.id", 42, "data.aws_ami.ubuntu"] },
                    "instance_type": { "constant_value": "t3.micro" },
                    "ebs_block_device": [{ "volume_size": { "constant_value": 8 } }]
                }
            }]}}
        }))
        .unwrap();

        let resource = &plan.config_root().unwrap().resources[0];
        assert_eq!(
            resource.expressions["ami"].references,
            vec!["data.aws_ami.ubuntu.id", "data.aws_ami.ubuntu"]
        );
        assert!(resource.expressions["instance_type"].references.is_empty());
        assert!(resource.expressions["ebs_block_device"].references.is_empty());
    }

    #[test]
    fn test_prior_state_shapes() {
        let nested: ChangePlan = serde_json::from_value(json!({
            "prior_state": { "values": { "root_module": {
                "resources": [{ "address": "aws_s3_bucket.old" }]
            }}}
        }))
        .unwrap();
        assert_eq!(nested.prior_root().unwrap().resources[0].address, "aws_s3_bucket.old");

        let bare: ChangePlan = serde_json::from_value(json!({
            "state": { "root_module": { "resources": [{ "address": "aws_s3_bucket.logs" }] } }
        }))
        .unwrap();
        assert_eq!(bare.prior_root().unwrap().resources[0].address, "aws_s3_bucket.logs");
    }

    #[test]
    fn test_output_value_alias() {
        let plan: ChangePlan = serde_json::from_value(json!({
            "configuration": { "root_module": { "outputs": {
                "vpc_id": { "value": { "references": ["module.network.vpc_id"] } }
            }}}
        }))
        .unwrap();
        let outputs = &plan.config_root().unwrap().outputs;
        assert_eq!(
            outputs["vpc_id"].expression.as_ref().unwrap().references,
            vec!["module.network.vpc_id"]
        );
    }
}
