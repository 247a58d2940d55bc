//! Attribute value provenance.
//!
//! Traces where a planned attribute value comes from: the literal seen in
//! the plan, the references behind its expression, or as a last resort
//! another resource holding the same value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::plan::ChangePlan;

use super::expressions::{ExpressionIndex, IndexEntry};

/// Step kind in a value flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    /// A literal or resolved value.
    Literal,
    /// An input variable.
    Var,
    /// A value passed into a module.
    ModuleInput,
    /// A module output.
    ModuleOutput,
    /// Another resource's attribute.
    ResourceAttribute,
    /// Origin unknown.
    Unknown,
}

/// One step of a value flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStep {
    /// Step kind.
    pub kind: FlowKind,
    /// Rendered detail (value, reference or message).
    pub detail: String,
}

/// Rendered explanation of a value flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueFlowExplanation {
    /// All sentences joined with spaces.
    pub explanation: String,
    /// One sentence per step.
    pub items: Vec<String>,
}

/// Value flow tracer.
#[derive(Debug, Default)]
pub struct ValueFlowAnalyzer;

impl ValueFlowAnalyzer {
    /// Traces the origin of `address.attribute`.
    #[must_use]
    pub fn trace(
        plan: &ChangePlan,
        index: &ExpressionIndex,
        address: &str,
        attribute: &str,
    ) -> Vec<FlowStep> {
        let planned = plan
            .find_change(address)
            .and_then(|rc| rc.change.after.as_ref())
            .and_then(|after| after.get(attribute));

        let mut steps = vec![planned.map_or_else(
            || FlowStep::new(FlowKind::Unknown, "Attribute not present in plan change.after"),
            |value| FlowStep::new(FlowKind::Literal, render_value(value)),
        )];

        let own: Vec<&IndexEntry> = index
            .resource_entries()
            .filter(|e| e.attribute == attribute && e.container_matches(address))
            .collect();

        if own.is_empty() {
            let consumers = index
                .resource_entries()
                .filter(|e| e.references.iter().any(|r| r.contains(address)));
            for entry in consumers {
                steps.extend(entry.references.iter().map(|r| classify_reference(r)));
            }
        } else {
            for entry in own {
                if entry.references.is_empty() {
                    steps.push(FlowStep::new(
                        FlowKind::Unknown,
                        "Expression present but no references exposed",
                    ));
                }
                steps.extend(entry.references.iter().map(|r| classify_reference(r)));
            }
        }

        if steps.len() == 1 && steps[0].kind == FlowKind::Literal {
            if let Some(step) = planned
                .and_then(render_scalar)
                .and_then(|literal| find_same_value(plan, address, attribute, &literal))
            {
                steps.push(step);
            } else {
                steps.push(FlowStep::new(
                    FlowKind::Unknown,
                    "Value appears to be a literal or resolved value; origin not traceable from plan JSON",
                ));
            }
        }

        steps
    }
}

/// Renders a value-flow trace as sentences.
#[must_use]
pub fn explain_value_flow(steps: &[FlowStep], attribute: &str) -> ValueFlowExplanation {
    let Some((first, rest)) = steps.split_first() else {
        return ValueFlowExplanation {
            explanation: String::from("Explanation unavailable"),
            items: Vec::new(),
        };
    };

    let mut items = Vec::new();
    if first.kind == FlowKind::Literal {
        items.push(format!(
            "`{attribute}` appears to be a literal or resolved value: {}",
            first.detail
        ));
    }

    items.extend(rest.iter().map(|step| {
        let detail = &step.detail;
        match step.kind {
            FlowKind::Var => format!("Because it references variable `{detail}`."),
            FlowKind::ModuleInput | FlowKind::ModuleOutput => {
                format!("Because it flows through module reference `{detail}`.")
            }
            FlowKind::ResourceAttribute => {
                format!("Because it references resource attribute `{detail}`.")
            }
            FlowKind::Unknown => format!("Origin not traceable from plan JSON: `{detail}`."),
            FlowKind::Literal => format!("Reference: `{detail}` (type: literal)"),
        }
    }));

    let explanation = if items.is_empty() {
        String::from("Explanation unavailable")
    } else {
        items.join(" ")
    };
    ValueFlowExplanation { explanation, items }
}

fn classify_reference(reference: &str) -> FlowStep {
    let kind = if reference.starts_with("var.") {
        FlowKind::Var
    } else if reference.starts_with("module.") {
        FlowKind::ModuleOutput
    } else if reference.contains('.') {
        FlowKind::ResourceAttribute
    } else {
        FlowKind::Unknown
    };
    FlowStep::new(kind, reference)
}

/// First other resource attribute whose scalar value renders the same.
fn find_same_value(
    plan: &ChangePlan,
    address: &str,
    attribute: &str,
    literal: &str,
) -> Option<FlowStep> {
    plan.resource_changes.iter().find_map(|rc| {
        let after = rc.change.after.as_ref()?.as_object()?;
        after.iter().find_map(|(key, value)| {
            let itself = rc.address == address && key == attribute;
            let matches = !itself && render_scalar(value).is_some_and(|v| v == literal);
            matches.then(|| {
                FlowStep::new(FlowKind::ResourceAttribute, format!("{}.{key}", rc.address))
            })
        })
    })
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Array(items) => format!("[array {}]", items.len()),
        Value::Object(_) => String::from("[object]"),
        scalar => render_scalar(scalar).unwrap_or_default(),
    }
}

fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::from("null")),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

impl FlowStep {
    /// Creates a step.
    #[must_use]
    pub fn new(kind: FlowKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Literal => "literal",
            Self::Var => "var",
            Self::ModuleInput => "module_input",
            Self::ModuleOutput => "module_output",
            Self::ResourceAttribute => "resource_attribute",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan() -> ChangePlan {
        serde_json::from_value(json!({
            "resource_changes": [
                {
                    "address": "aws_instance.web",
                    "change": { "actions": ["create"], "after": {
                        "ami": "ami-123",
                        "instance_type": "t3.micro",
                        "tags": { "Name": "web" },
                        "subnet_id": null
                    }}
                },
                {
                    "address": "aws_launch_template.web",
                    "change": { "actions": ["create"], "after": { "image_id": "ami-123" } }
                },
                {
                    "address": "aws_s3_bucket.logs",
                    "change": { "actions": ["create"], "after": { "bucket": "logs" } }
                }
            ],
            "configuration": { "root_module": { "resources": [
                {
                    "address": "aws_instance.web",
                    "expressions": {
                        "instance_type": { "references": ["var.instance_type"] },
                        "subnet_id": { "references": ["module.network.subnet_id", "module.network"] },
                        "tags": { "constant_value": { "Name": "web" } }
                    }
                }
            ]}}
        }))
        .unwrap()
    }

    #[test]
    fn test_trace_variable() {
        let plan = plan();
        let index = ExpressionIndex::build(&plan);
        let steps = ValueFlowAnalyzer::trace(&plan, &index, "aws_instance.web", "instance_type");
        assert_eq!(
            steps,
            vec![
                FlowStep::new(FlowKind::Literal, "t3.micro"),
                FlowStep::new(FlowKind::Var, "var.instance_type"),
            ]
        );
    }

    #[test]
    fn test_trace_module_output_and_null_literal() {
        let plan = plan();
        let index = ExpressionIndex::build(&plan);
        let steps = ValueFlowAnalyzer::trace(&plan, &index, "aws_instance.web", "subnet_id");
        assert_eq!(steps[0], FlowStep::new(FlowKind::Literal, "null"));
        assert_eq!(steps[1].kind, FlowKind::ModuleOutput);
        assert_eq!(steps.len(), 3);
    }

    #[test]
    fn test_trace_expression_without_references() {
        let plan = plan();
        let index = ExpressionIndex::build(&plan);
        let steps = ValueFlowAnalyzer::trace(&plan, &index, "aws_instance.web", "tags");
        assert_eq!(steps[0].detail, "[object]");
        assert_eq!(
            steps[1],
            FlowStep::new(FlowKind::Unknown, "Expression present but no references exposed")
        );
    }

    #[test]
    fn test_trace_same_value_elsewhere() {
        let plan = plan();
        let index = ExpressionIndex::build(&plan);
        let steps = ValueFlowAnalyzer::trace(&plan, &index, "aws_instance.web", "ami");
        assert_eq!(
            steps[1],
            FlowStep::new(FlowKind::ResourceAttribute, "aws_launch_template.web.image_id")
        );
    }

    #[test]
    fn test_trace_untraceable_literal() {
        let plan = plan();
        let index = ExpressionIndex::build(&plan);
        let steps = ValueFlowAnalyzer::trace(&plan, &index, "aws_s3_bucket.logs", "bucket");
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].kind, FlowKind::Unknown);
    }

    #[test]
    fn test_trace_missing_attribute() {
        let plan = plan();
        let index = ExpressionIndex::build(&plan);
        let steps = ValueFlowAnalyzer::trace(&plan, &index, "aws_s3_bucket.logs", "acl");
        assert_eq!(
            steps,
            vec![FlowStep::new(FlowKind::Unknown, "Attribute not present in plan change.after")]
        );
    }

    #[test]
    fn test_explain_value_flow() {
        let steps = vec![
            FlowStep::new(FlowKind::Literal, "t3.micro"),
            FlowStep::new(FlowKind::Var, "var.instance_type"),
        ];
        let explained = explain_value_flow(&steps, "instance_type");
        assert_eq!(
            explained.items,
            vec![
                "`instance_type` appears to be a literal or resolved value: t3.micro",
                "Because it references variable `var.instance_type`.",
            ]
        );
        assert_eq!(explained.explanation, explained.items.join(" "));

        assert_eq!(explain_value_flow(&[], "x").explanation, "Explanation unavailable");
    }
}
