//! Human-readable summaries of individual resource changes.
//!
//! Nothing here modifies plan data; it only derives labels, renderings and
//! risk annotations for display.

use serde::Serialize;
use serde_json::Value;

use super::types::{RawAction, ResourceChange};

/// Maximum rendered length of a string value before truncation.
const MAX_VALUE_LEN: usize = 60;

/// Attribute name fragments that mark computed (non-editable) fields.
const COMPUTED_PATTERNS: &[&str] = &["id", "arn", "available_", "created_at", "updated_at"];

/// Display summary of one resource change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSummary {
    /// Full address.
    pub address: String,
    /// Resource type (first address segment).
    pub resource_type: String,
    /// Resource name (last address segment).
    pub resource_name: String,
    /// Module context, or `root`.
    pub module_context: String,
    /// First raw action, or `no-op`.
    pub action: String,
    /// Planned attribute values.
    pub after: Option<Value>,
}

impl ResourceSummary {
    /// Builds a summary from a resource change.
    #[must_use]
    pub fn from_change(change: &ResourceChange) -> Self {
        let address = change.address.clone();
        let parts: Vec<&str> = address.split('.').collect();
        let resource_type = parts.first().copied().unwrap_or_default().to_string();
        let resource_name = parts.last().copied().unwrap_or_default().to_string();
        let module_context = if parts.len() > 2 {
            parts[..parts.len() - 1].join(".")
        } else {
            String::from("root")
        };
        let action = change
            .change
            .actions
            .first()
            .map_or(RawAction::NoOp, |a| *a)
            .to_string();

        Self {
            address,
            resource_type,
            resource_name,
            module_context,
            action,
            after: change.change.after.clone(),
        }
    }

    /// Returns risk annotations for the planned values.
    #[must_use]
    pub fn risks(&self) -> Vec<String> {
        self.after
            .as_ref()
            .map(|after| annotate_risks(&self.resource_type, after))
            .unwrap_or_default()
    }
}

/// Maps an attribute name to a display category.
#[must_use]
pub fn category_label(key: &str) -> &'static str {
    if matches!(key, "ingress" | "egress") || key.contains("rule") {
        "Rules"
    } else if matches!(key, "tags" | "labels") {
        "Metadata"
    } else if key.contains("listener") {
        "Listeners"
    } else if key.contains("block_device") {
        "Storage"
    } else if key.contains("zone") {
        "Availability"
    } else if key.contains("security_group") {
        "Security"
    } else {
        "Configuration"
    }
}

/// Returns true if the attribute is typically user-editable.
#[must_use]
pub fn is_editable_field(key: &str) -> bool {
    let lower = key.to_lowercase();
    !COMPUTED_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Renders an attribute value for compact display.
#[must_use]
pub fn render_block_value(value: &Value) -> String {
    match value {
        Value::Null => String::from("(empty)"),
        Value::Bool(b) => String::from(if *b { "Yes" } else { "No" }),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if s.chars().count() > MAX_VALUE_LEN {
                let head: String = s.chars().take(MAX_VALUE_LEN).collect();
                format!("{head}...")
            } else {
                s.clone()
            }
        }
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(_) => value.to_string(),
    }
}

/// Describes ingress/egress rule blocks as one line each.
#[must_use]
pub fn describe_rules(rules: &[Value]) -> Vec<String> {
    rules
        .iter()
        .map(|rule| {
            let from_port = port_label(rule.get("from_port"));
            let to_port = port_label(rule.get("to_port"));
            let protocol = rule
                .get("protocol")
                .and_then(Value::as_str)
                .filter(|p| !p.is_empty())
                .unwrap_or("tcp")
                .to_uppercase();
            let cidr = first_string(rule.get("cidr_blocks"))
                .or_else(|| first_string(rule.get("ipv6_cidr_blocks")))
                .unwrap_or("N/A");

            let ports = if from_port == to_port {
                from_port
            } else {
                format!("{from_port}-{to_port}")
            };
            let line = format!("{protocol} port {ports} from {cidr}");
            if cidr == "0.0.0.0/0" {
                format!("{line} (public)")
            } else {
                line
            }
        })
        .collect()
}

/// Flags risky settings in a resource's planned values.
#[must_use]
pub fn annotate_risks(resource_type: &str, config: &Value) -> Vec<String> {
    let mut risks = Vec::new();

    if resource_type.contains("security_group") {
        let egress = config.get("egress").and_then(Value::as_array);
        let all_ports = egress.is_some_and(|rules| {
            rules.iter().any(|r| {
                r.get("from_port").and_then(Value::as_i64) == Some(0)
                    && r.get("to_port").and_then(Value::as_i64) == Some(65535)
            })
        });
        if all_ports {
            risks.push(String::from("Allows all outbound traffic"));
        }

        let ingress = config.get("ingress").and_then(Value::as_array);
        let public = ingress.is_some_and(|rules| {
            rules.iter().any(|r| {
                r.get("cidr_blocks")
                    .and_then(Value::as_array)
                    .is_some_and(|blocks| blocks.iter().any(|b| b.as_str() == Some("0.0.0.0/0")))
            })
        });
        if public {
            risks.push(String::from("Publicly accessible on some ports"));
        }
    }

    if config.get("associate_public_ip_address").and_then(Value::as_bool) == Some(true) {
        risks.push(String::from("Publicly accessible"));
    }

    if config.get("cidr_block").and_then(Value::as_str) == Some("0.0.0.0/0") {
        risks.push(String::from("Wide CIDR range (0.0.0.0/0)"));
    }

    risks
}

fn port_label(value: Option<&Value>) -> String {
    match value {
        Some(Value::Null) | None => String::from("all"),
        Some(v) => render_block_value(v),
    }
}

fn first_string(value: Option<&Value>) -> Option<&str> {
    value?.as_array()?.first()?.as_str()
}
