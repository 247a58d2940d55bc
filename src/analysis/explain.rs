//! Human-readable dependency explanations.
//!
//! Explanations combine a shortest graph path with attribute-level
//! evidence from the expression index. When no evidence exists the engine
//! says so in an `unknown` explanation instead of failing.

use serde::{Deserialize, Serialize};

use crate::graph::Graph;

use super::expressions::{ExpressionIndex, IndexEntry};
use super::impact::ImpactResult;

const NO_PATH: &str = "Explanation unavailable: no dependency path found in graph";
const NO_PREDECESSOR: &str = "No predecessor found in path";
const NO_SUBJECT: &str = "Refactor warning has no identifiable subject";
const NO_CONSUMERS: &str =
    "No consuming resources or references found in plan configuration. Explanation unavailable.";

/// Category of an explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasonType {
    /// Resource-to-resource dependency.
    Dependency,
    /// Input variable reference.
    Variable,
    /// Output reference.
    Output,
    /// No explanation could be derived.
    Unknown,
}

/// An explanation for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    /// Address being explained.
    pub subject: String,
    /// Category.
    pub reason_type: ReasonType,
    /// Sentence describing the reason.
    pub explanation: String,
    /// Dependency path, when one was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<String>>,
}

/// A warning about something being renamed or removed.
///
/// The subject is the first non-empty of `subject_address`, `target` and
/// `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactorWarning {
    /// Address of the affected item.
    #[serde(default)]
    pub subject_address: Option<String>,
    /// Alternative target address.
    #[serde(default)]
    pub target: Option<String>,
    /// Bare name of the affected item.
    #[serde(default)]
    pub name: Option<String>,
}

/// Explanation engine over one configuration and graph.
#[derive(Debug)]
pub struct ExplainEngine<'a> {
    index: &'a ExpressionIndex,
    graph: &'a Graph,
}

/// An attribute reference linking two resources.
struct AttributeReference<'a> {
    attribute: &'a str,
    reference: &'a str,
}

impl<'a> ExplainEngine<'a> {
    /// Creates an engine.
    #[must_use]
    pub const fn new(index: &'a ExpressionIndex, graph: &'a Graph) -> Self {
        Self { index, graph }
    }

    /// Explains why each impacted node is affected by the impact source.
    ///
    /// Produces exactly one explanation per node in `result.all`.
    #[must_use]
    pub fn explain_why_for_impact(&self, result: &ImpactResult) -> Vec<Explanation> {
        result
            .all
            .iter()
            .map(|node| self.explain_subject(&result.source, &node.address))
            .collect()
    }

    fn explain_subject(&self, source: &str, subject: &str) -> Explanation {
        let Some(path) = self.graph.shortest_path(source, subject) else {
            return Explanation::unknown(subject, NO_PATH, None);
        };

        let Some(predecessor) = path.len().checked_sub(2).and_then(|i| path.get(i)) else {
            return Explanation::unknown(subject, NO_PREDECESSOR, Some(path));
        };

        let explanation = match self.find_attribute_reference(predecessor, subject) {
            Some(found) => format!(
                "Depends on {predecessor} via {subject}.{}, which references {}",
                found.attribute, found.reference
            ),
            None => format!(
                "Dependency path: {}. No attribute-level reference exposed in plan configuration.",
                render_path(&path)
            ),
        };

        Explanation {
            subject: subject.to_string(),
            reason_type: ReasonType::Dependency,
            explanation,
            path: Some(path),
        }
    }

    /// Finds an expression on `to` that references `from`, falling back to
    /// any expression mentioning both.
    fn find_attribute_reference(&self, from: &str, to: &str) -> Option<AttributeReference<'a>> {
        let direct = self
            .index
            .resource_entries()
            .filter(|entry| entry.container_matches(to))
            .find_map(|entry| {
                entry
                    .references
                    .iter()
                    .find(|r| reference_points_at(r, from))
                    .map(|r| AttributeReference {
                        attribute: &entry.attribute,
                        reference: r,
                    })
            });
        if direct.is_some() {
            return direct;
        }

        self.index.resource_entries().find_map(|entry| {
            let mentions_to = entry.references.iter().any(|r| r.contains(to));
            let from_ref = entry.references.iter().find(|r| r.contains(from))?;
            mentions_to.then_some(AttributeReference {
                attribute: &entry.attribute,
                reference: from_ref,
            })
        })
    }

    /// Explains the consumers of a refactor warning's subject.
    ///
    /// Produces one explanation per consuming reference, or a single
    /// `unknown` explanation when there are none.
    #[must_use]
    pub fn explain_refactor_warning(&self, warning: &RefactorWarning) -> Vec<Explanation> {
        let Some(subject) = warning.subject() else {
            return vec![Explanation::unknown("unknown", NO_SUBJECT, None)];
        };

        let reason_type = refactor_reason_type(subject);
        let explanations: Vec<Explanation> = self
            .index
            .resource_entries()
            .flat_map(|entry| consuming_references(entry, subject))
            .map(|(entry, reference)| {
                let path = self.graph.shortest_path(subject, &entry.container);
                let mut explanation = format!(
                    "Referenced by {}.{} (expression reference: {reference})",
                    entry.container, entry.attribute
                );
                if let Some(path) = &path {
                    explanation.push_str(&format!(" via path {}", render_path(path)));
                }
                Explanation {
                    subject: subject.to_string(),
                    reason_type,
                    explanation,
                    path,
                }
            })
            .collect();

        if explanations.is_empty() {
            vec![Explanation::unknown(subject, NO_CONSUMERS, None)]
        } else {
            explanations
        }
    }
}

fn consuming_references<'e>(
    entry: &'e IndexEntry,
    subject: &'e str,
) -> impl Iterator<Item = (&'e IndexEntry, &'e str)> + 'e {
    entry
        .references
        .iter()
        .filter(move |r| r.contains(subject) || subject.contains(r.as_str()))
        .map(move |r| (entry, r.as_str()))
}

/// True if `reference` names `address`, either by containment or through its
/// parent path.
fn reference_points_at(reference: &str, address: &str) -> bool {
    if reference.contains(address) || address.contains(reference) {
        return true;
    }
    reference
        .rsplit_once('.')
        .is_some_and(|(parent, _)| parent.contains(address))
}

fn refactor_reason_type(subject: &str) -> ReasonType {
    if subject.starts_with("var.") {
        ReasonType::Variable
    } else if subject.starts_with("output.") {
        ReasonType::Output
    } else {
        ReasonType::Dependency
    }
}

/// Joins a path with arrows.
#[must_use]
pub fn render_path(path: &[String]) -> String {
    path.join(" → ")
}

impl Explanation {
    fn unknown(subject: &str, explanation: &str, path: Option<Vec<String>>) -> Self {
        Self {
            subject: subject.to_string(),
            reason_type: ReasonType::Unknown,
            explanation: explanation.to_string(),
            path,
        }
    }
}

impl RefactorWarning {
    /// Creates a warning about an address.
    #[must_use]
    pub fn for_address(address: impl Into<String>) -> Self {
        Self {
            subject_address: Some(address.into()),
            ..Self::default()
        }
    }

    /// Returns the subject, by order of preference.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        [&self.subject_address, &self.target, &self.name]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
    }
}

impl std::fmt::Display for ReasonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Dependency => "dependency",
            Self::Variable => "variable",
            Self::Output => "output",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ActionMap, ImpactAnalyzer};
    use crate::graph::Edge;
    use crate::plan::ChangePlan;
    use serde_json::json;

    fn fixture() -> (ExpressionIndex, Graph) {
        let plan: ChangePlan = serde_json::from_value(json!({
            "configuration": { "root_module": { "resources": [
                {
                    "address": "aws_subnet.a",
                    "expressions": { "vpc_id": { "references": ["aws_vpc.main.id", "aws_vpc.main"] } }
                },
                {
                    "address": "aws_instance.web",
                    "expressions": {
                        "ami": { "references": ["var.ami_id"] },
                        "subnet_id": { "references": ["aws_subnet.a.id", "aws_subnet.a"] }
                    }
                },
                {
                    "address": "aws_eip.web",
                    "expressions": { "domain": { "constant_value": "vpc" } }
                }
            ]}}
        }))
        .unwrap();
        let graph = Graph::from_edges([
            Edge::new("aws_vpc.main", "aws_subnet.a"),
            Edge::new("aws_subnet.a", "aws_instance.web"),
            Edge::new("aws_instance.web", "aws_eip.web"),
        ]);
        (ExpressionIndex::build(&plan), graph)
    }

    #[test]
    fn test_explain_impact() {
        let (index, graph) = fixture();
        let impact = ImpactAnalyzer::new(&graph, &ActionMap::default()).analyze("aws_vpc.main");
        let explanations = ExplainEngine::new(&index, &graph).explain_why_for_impact(&impact);

        assert_eq!(explanations.len(), impact.all.len());
        assert_eq!(
            explanations[0].explanation,
            "Depends on aws_vpc.main via aws_subnet.a.vpc_id, which references aws_vpc.main.id"
        );
        assert_eq!(
            explanations[1].explanation,
            "Depends on aws_subnet.a via aws_instance.web.subnet_id, which references aws_subnet.a.id"
        );
        assert_eq!(explanations[2].reason_type, ReasonType::Dependency);
        assert_eq!(
            explanations[2].explanation,
            "Dependency path: aws_vpc.main → aws_subnet.a → aws_instance.web → aws_eip.web. \
             No attribute-level reference exposed in plan configuration."
        );
        assert_eq!(explanations[2].path.as_ref().map(Vec::len), Some(4));
    }

    #[test]
    fn test_explain_impact_without_path() {
        let (index, graph) = fixture();
        let impact = ImpactResult {
            source: "aws_eip.web".into(),
            direct: vec![],
            transitive: vec![],
            all: vec![crate::analysis::ImpactNode {
                address: "aws_vpc.main".into(),
                depth: 1,
                action: None,
                has_draft: false,
                warnings: vec![],
            }],
            truncated: false,
        };
        let explanations = ExplainEngine::new(&index, &graph).explain_why_for_impact(&impact);
        assert_eq!(explanations[0].reason_type, ReasonType::Unknown);
        assert_eq!(explanations[0].explanation, NO_PATH);
        assert!(explanations[0].path.is_none());
    }

    #[test]
    fn test_explain_impact_from_third_party_reference() {
        let plan: ChangePlan = serde_json::from_value(json!({
            "configuration": { "root_module": { "resources": [
                {
                    "address": "aws_instance.app",
                    "expressions": { "ami": { "references": ["var.ami_id"] } }
                },
                {
                    "address": "aws_network_interface_sg_attachment.app",
                    "expressions": { "attachment": { "references": [
                        "aws_instance.app.primary_network_interface_id",
                        "aws_security_group.sg.id"
                    ]}}
                }
            ]}}
        }))
        .unwrap();
        let index = ExpressionIndex::build(&plan);
        let graph = Graph::from_edges([Edge::new("aws_security_group.sg", "aws_instance.app")]);

        let impact =
            ImpactAnalyzer::new(&graph, &ActionMap::default()).analyze("aws_security_group.sg");
        let explanations = ExplainEngine::new(&index, &graph).explain_why_for_impact(&impact);

        assert_eq!(explanations.len(), 1);
        assert_eq!(explanations[0].reason_type, ReasonType::Dependency);
        assert_eq!(
            explanations[0].explanation,
            "Depends on aws_security_group.sg via aws_instance.app.attachment, \
             which references aws_security_group.sg.id"
        );
    }

    #[test]
    fn test_refactor_variable() {
        let (index, graph) = fixture();
        let warning = RefactorWarning {
            name: Some("var.ami_id".into()),
            ..RefactorWarning::default()
        };
        let explanations = ExplainEngine::new(&index, &graph).explain_refactor_warning(&warning);
        assert_eq!(explanations.len(), 1);
        assert_eq!(explanations[0].reason_type, ReasonType::Variable);
        assert_eq!(
            explanations[0].explanation,
            "Referenced by aws_instance.web.ami (expression reference: var.ami_id)"
        );
    }

    #[test]
    fn test_refactor_resource_with_path() {
        let (index, graph) = fixture();
        let explanations = ExplainEngine::new(&index, &graph)
            .explain_refactor_warning(&RefactorWarning::for_address("aws_subnet.a"));
        assert_eq!(explanations.len(), 2);
        assert!(explanations.iter().all(|e| e.reason_type == ReasonType::Dependency));
        assert_eq!(
            explanations[0].explanation,
            "Referenced by aws_instance.web.subnet_id (expression reference: aws_subnet.a.id) \
             via path aws_subnet.a → aws_instance.web"
        );
    }

    #[test]
    fn test_refactor_without_subject_or_consumers() {
        let (index, graph) = fixture();
        let engine = ExplainEngine::new(&index, &graph);

        let none = engine.explain_refactor_warning(&RefactorWarning::default());
        assert_eq!(none[0].subject, "unknown");
        assert_eq!(none[0].explanation, NO_SUBJECT);

        let unused = engine.explain_refactor_warning(&RefactorWarning::for_address("output.unused"));
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].reason_type, ReasonType::Unknown);
        assert_eq!(unused[0].explanation, NO_CONSUMERS);
    }

    #[test]
    fn test_subject_preference() {
        let warning = RefactorWarning {
            subject_address: Some(String::new()),
            target: Some("module.db".into()),
            name: Some("db".into()),
        };
        assert_eq!(warning.subject(), Some("module.db"));
    }
}
