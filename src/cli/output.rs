//! Output formatting for CLI commands.
//!
//! Every analysis result renders either as colored text with tables or as
//! pretty-printed JSON.

use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::analysis::{
    Action, DriftResult, Explanation, FlowStep, ImpactNode, ImpactResult, OutputUsageResult,
    explain_value_flow, render_path,
};
use crate::config::ValidationResult;
use crate::graph::Graph;
use crate::plan::{
    ResourceSummary, category_label, describe_rules, is_editable_field, render_block_value,
};
use crate::schema::ResourceSchema;
use crate::session::AnalysisReport;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Impact node row for table display.
#[derive(Tabled)]
struct ImpactRow {
    #[tabled(rename = "Depth")]
    depth: usize,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Draft")]
    draft: String,
    #[tabled(rename = "Warnings")]
    warnings: String,
}

/// Graph edge row for table display.
#[derive(Tabled)]
struct EdgeRow {
    #[tabled(rename = "From")]
    source: String,
    #[tabled(rename = "To")]
    target: String,
}

/// Resource attribute row for table display.
#[derive(Tabled)]
struct AttributeRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Attribute")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Editable")]
    editable: String,
}

/// Schema attribute row for table display.
#[derive(Tabled)]
struct SchemaRow {
    #[tabled(rename = "Attribute")]
    name: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Type")]
    attr_type: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a session report.
    #[must_use]
    pub fn format_summary(&self, report: &AnalysisReport) -> String {
        match self.format {
            OutputFormat::Json => to_json(report),
            OutputFormat::Text => {
                let mut output = String::new();
                let _ = write!(
                    output,
                    "\nPlan summary (fingerprint {})\n\n",
                    report.fingerprint.chars().take(8).collect::<String>()
                );
                let _ = writeln!(
                    output,
                    "   {} to create, {} to update, {} to delete, {} unchanged",
                    report.summary.create.to_string().green(),
                    report.summary.update.to_string().yellow(),
                    report.summary.delete.to_string().red(),
                    report.summary.no_change.to_string().dimmed()
                );
                let _ = writeln!(
                    output,
                    "   Graph: {} nodes, {} edges",
                    report.node_count, report.edge_count
                );
                if report.ambiguous_labels > 0 {
                    let _ = writeln!(
                        output,
                        "   {} {} graph labels matched more than one resource",
                        "!".yellow(),
                        report.ambiguous_labels
                    );
                }
                let _ = writeln!(
                    output,
                    "   Drift: {} drifted, {} orphaned",
                    report.drift.drifted.len(),
                    report.drift.orphaned.len()
                );
                output
            }
        }
    }

    /// Formats the canonical graph.
    #[must_use]
    pub fn format_graph(&self, graph: &Graph) -> String {
        match self.format {
            OutputFormat::Json => to_json(graph),
            OutputFormat::Text => {
                let mut output = format!(
                    "\nDependency graph: {} nodes, {} edges\n\n",
                    graph.node_count(),
                    graph.edge_count()
                );
                if graph.edge_count() == 0 {
                    output.push_str("   No edges.\n");
                    return output;
                }
                let rows: Vec<EdgeRow> = graph
                    .edges()
                    .map(|e| EdgeRow {
                        source: e.source.clone(),
                        target: e.target.clone(),
                    })
                    .collect();
                output.push_str(&Table::new(rows).to_string());
                output.push('\n');
                output
            }
        }
    }

    /// Formats an impact result, optionally with explanations.
    #[must_use]
    pub fn format_impact(&self, result: &ImpactResult, explanations: &[Explanation]) -> String {
        match self.format {
            OutputFormat::Json => to_json(&serde_json::json!({
                "impact": result,
                "explanations": explanations,
            })),
            OutputFormat::Text => {
                if result.is_empty() {
                    return format!(
                        "{} Nothing depends on {}.\n",
                        "✓".green(),
                        result.source.bold()
                    );
                }

                let mut output = format!("\nImpact of {}\n\n", result.source.bold());
                let rows: Vec<ImpactRow> = result.all.iter().map(Self::impact_row).collect();
                output.push_str(&Table::new(rows).to_string());
                output.push('\n');

                let _ = write!(
                    output,
                    "\n{} direct, {} transitive\n",
                    result.direct.len(),
                    result.transitive.len()
                );
                if result.truncated {
                    let _ = writeln!(
                        output,
                        "{} Traversal stopped at the node budget; results are partial.",
                        "!".yellow()
                    );
                }

                if !explanations.is_empty() {
                    output.push('\n');
                    output.push_str(&Self::explanations_text(explanations));
                }
                output
            }
        }
    }

    /// Formats a list of explanations.
    #[must_use]
    pub fn format_explanations(&self, subject: &str, explanations: &[Explanation]) -> String {
        match self.format {
            OutputFormat::Json => to_json(&explanations),
            OutputFormat::Text => {
                if explanations.is_empty() {
                    return format!("{} No consumers found for {}.\n", "✓".green(), subject.bold());
                }
                format!(
                    "\nConsumers of {}\n\n{}",
                    subject.bold(),
                    Self::explanations_text(explanations)
                )
            }
        }
    }

    /// Formats a drift result.
    #[must_use]
    pub fn format_drift(&self, result: &DriftResult) -> String {
        match self.format {
            OutputFormat::Json => to_json(result),
            OutputFormat::Text => {
                if result.is_clean() {
                    return format!("{} No drift detected.\n", "✓".green());
                }

                let mut output = format!("{} Drift detected:\n\n", "!".yellow());
                for entry in &result.drifted {
                    let _ = writeln!(output, "   ~ {} ({})", entry.address, entry.reason);
                }
                for entry in &result.orphaned {
                    let _ = writeln!(output, "   {} {} ({})", "?".red(), entry.address, entry.reason);
                }
                let _ = write!(
                    output,
                    "\n{} drifted, {} orphaned\n",
                    result.drifted.len(),
                    result.orphaned.len()
                );
                output
            }
        }
    }

    /// Formats output usage.
    #[must_use]
    pub fn format_output_usage(&self, result: &OutputUsageResult) -> String {
        match self.format {
            OutputFormat::Json => to_json(result),
            OutputFormat::Text => {
                if result.is_unused() {
                    return format!(
                        "{} {} is not referenced anywhere.\n",
                        "✓".green(),
                        result.identifier.bold()
                    );
                }

                let mut output = format!("\nUsage of {}\n", result.identifier.bold());
                for (title, items) in [
                    ("Modules", &result.direct_modules),
                    ("Resources", &result.direct_resources),
                    ("Transitive", &result.transitive_resources),
                ] {
                    if items.is_empty() {
                        continue;
                    }
                    let _ = write!(output, "\n{title}:\n");
                    for item in items {
                        let _ = writeln!(output, "   - {item}");
                    }
                }
                output
            }
        }
    }

    /// Formats a value flow trace.
    #[must_use]
    pub fn format_flow(&self, address: &str, attribute: &str, steps: &[FlowStep]) -> String {
        let explained = explain_value_flow(steps, attribute);
        match self.format {
            OutputFormat::Json => to_json(&serde_json::json!({
                "address": address,
                "attribute": attribute,
                "steps": steps,
                "explanation": explained,
            })),
            OutputFormat::Text => {
                let mut output = format!("\n{}.{}\n\n", address.bold(), attribute);
                for step in steps {
                    let _ = writeln!(output, "   [{}] {}", step.kind, step.detail);
                }
                let _ = write!(output, "\n{}\n", explained.explanation);
                for item in &explained.items {
                    let _ = writeln!(output, "   - {item}");
                }
                output
            }
        }
    }

    /// Formats a resource summary.
    #[must_use]
    pub fn format_resource(&self, summary: &ResourceSummary) -> String {
        let risks = summary.risks();
        match self.format {
            OutputFormat::Json => to_json(&serde_json::json!({
                "resource": summary,
                "risks": risks,
            })),
            OutputFormat::Text => {
                let mut output = String::new();
                let _ = write!(
                    output,
                    "\n{} {}\n",
                    Self::format_raw_action(&summary.action),
                    summary.address.bold()
                );
                let _ = writeln!(output, "   Type: {}", summary.resource_type);
                let _ = writeln!(output, "   Name: {}", summary.resource_name);
                let _ = writeln!(output, "   Module: {}", summary.module_context);

                if let Some(serde_json::Value::Object(after)) = &summary.after {
                    output.push('\n');
                    let mut rows = Vec::new();
                    let mut rules = Vec::new();
                    for (key, value) in after {
                        if let serde_json::Value::Array(items) = value {
                            if matches!(key.as_str(), "ingress" | "egress") {
                                rules.extend(
                                    describe_rules(items).into_iter().map(|r| format!("{key}: {r}")),
                                );
                            }
                        }
                        rows.push(AttributeRow {
                            category: category_label(key).to_string(),
                            name: key.clone(),
                            value: render_block_value(value),
                            editable: if is_editable_field(key) { "yes" } else { "no" }.to_string(),
                        });
                    }
                    output.push_str(&Table::new(rows).to_string());
                    output.push('\n');

                    if !rules.is_empty() {
                        output.push_str("\nRules:\n");
                        for rule in &rules {
                            let _ = writeln!(output, "   - {rule}");
                        }
                    }
                }

                if !risks.is_empty() {
                    let _ = write!(output, "\n{} Risks:\n", "!".yellow());
                    for risk in &risks {
                        let _ = writeln!(output, "   - {risk}");
                    }
                }
                output
            }
        }
    }

    /// Formats a resource schema.
    #[must_use]
    pub fn format_schema(&self, resource_type: &str, schema: &ResourceSchema) -> String {
        match self.format {
            OutputFormat::Json => to_json(schema),
            OutputFormat::Text => {
                let mut output = format!(
                    "\nSchema for {} (version {})\n\n",
                    resource_type.bold(),
                    schema.version
                );
                let rows: Vec<SchemaRow> = schema
                    .block
                    .attributes
                    .iter()
                    .map(|(name, attr)| SchemaRow {
                        name: name.clone(),
                        mode: attr.mode().to_string(),
                        attr_type: attr
                            .attr_type
                            .as_ref()
                            .map_or_else(String::new, ToString::to_string),
                        description: truncate(attr.description.as_deref().unwrap_or(""), 50),
                    })
                    .collect();
                output.push_str(&Table::new(rows).to_string());
                output.push('\n');

                if !schema.block.block_types.is_empty() {
                    let names: Vec<&str> =
                        schema.block.block_types.keys().map(String::as_str).collect();
                    let _ = write!(output, "\nNested blocks: {}\n", names.join(", "));
                }
                output
            }
        }
    }

    /// Formats a validation result.
    #[must_use]
    pub fn format_validation(&self, result: &ValidationResult) -> String {
        match self.format {
            OutputFormat::Json => to_json(&serde_json::json!({
                "valid": result.is_valid(),
                "errors": result.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "warnings": result.warnings,
            })),
            OutputFormat::Text => {
                let mut output = format!("{} Configuration is valid.\n", "✓".green());
                if !result.warnings.is_empty() {
                    let _ = write!(output, "\n{} Warnings:\n", "!".yellow());
                    for warning in &result.warnings {
                        let _ = writeln!(output, "   - {warning}");
                    }
                }
                output
            }
        }
    }

    /// Formats a plain status message.
    #[must_use]
    pub fn format_message(&self, message: &str) -> String {
        match self.format {
            OutputFormat::Json => to_json(&serde_json::json!({ "status": "success", "message": message })),
            OutputFormat::Text => format!("{} {message}\n", "✓".green()),
        }
    }

    fn impact_row(node: &ImpactNode) -> ImpactRow {
        ImpactRow {
            depth: node.depth,
            address: node.address.clone(),
            action: node
                .action
                .map_or_else(|| "unknown".dimmed().to_string(), Self::format_action),
            draft: if node.has_draft { "yes" } else { "" }.to_string(),
            warnings: node.warnings.join("; "),
        }
    }

    fn explanations_text(explanations: &[Explanation]) -> String {
        let mut output = String::new();
        for explanation in explanations {
            let _ = writeln!(
                output,
                "   {} [{}] {}",
                explanation.subject.bold(),
                explanation.reason_type,
                explanation.explanation
            );
            if let Some(path) = &explanation.path {
                let _ = writeln!(output, "      {}", render_path(path).dimmed());
            }
        }
        output
    }

    /// Formats an effective action with color.
    fn format_action(action: Action) -> String {
        match action {
            Action::Create => "+create".green().to_string(),
            Action::Update => "~update".yellow().to_string(),
            Action::Delete => "-delete".red().to_string(),
            Action::Replace => "-/+replace".red().to_string(),
            Action::NoOp => "no-op".dimmed().to_string(),
        }
    }

    /// Formats a raw action name with color.
    fn format_raw_action(action: &str) -> String {
        match action {
            "create" => "+create".green().to_string(),
            "update" => "~update".yellow().to_string(),
            "delete" => "-delete".red().to_string(),
            other => other.dimmed().to_string(),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Truncates a string to a maximum number of characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::DriftEntry;

    fn plain(format: OutputFormat) -> OutputFormatter {
        colored::control::set_override(false);
        OutputFormatter::new(format)
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_drift_text_and_json() {
        let result = DriftResult {
            drifted: vec![DriftEntry {
                address: String::from("aws_vpc.main"),
                reason: String::from("Change detected (update)"),
            }],
            orphaned: Vec::new(),
        };

        let text = plain(OutputFormat::Text).format_drift(&result);
        assert!(text.contains("aws_vpc.main"));
        assert!(text.contains("1 drifted, 0 orphaned"));

        let json: serde_json::Value =
            serde_json::from_str(&plain(OutputFormat::Json).format_drift(&result)).unwrap();
        assert_eq!(json["drifted"][0]["address"], "aws_vpc.main");
    }

    #[test]
    fn test_empty_impact() {
        let result = ImpactResult {
            source: String::from("aws_vpc.main"),
            direct: Vec::new(),
            transitive: Vec::new(),
            all: Vec::new(),
            truncated: false,
        };
        let text = plain(OutputFormat::Text).format_impact(&result, &[]);
        assert!(text.contains("Nothing depends on aws_vpc.main"));
    }

    #[test]
    fn test_resource_text_lists_rules_and_risks() {
        let summary = ResourceSummary {
            address: String::from("aws_security_group.web"),
            resource_type: String::from("aws_security_group"),
            resource_name: String::from("web"),
            module_context: String::from("root"),
            action: String::from("create"),
            after: Some(serde_json::json!({
                "ingress": [{ "from_port": 443, "to_port": 443, "protocol": "tcp", "cidr_blocks": ["0.0.0.0/0"] }],
                "name": "web"
            })),
        };
        let text = plain(OutputFormat::Text).format_resource(&summary);
        assert!(text.contains("TCP port 443 from 0.0.0.0/0 (public)"));
        assert!(text.contains("Publicly accessible on some ports"));
    }
}
