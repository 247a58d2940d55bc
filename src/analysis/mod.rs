//! Change-plan analyses.
//!
//! Every analyzer here is a pure function of its inputs:
//! - Classifying raw actions and summarizing a plan
//! - Computing the downstream impact of a resource
//! - Detecting drift between configuration and recorded state
//! - Finding consumers of a module or output
//! - Explaining dependencies and tracing attribute values

mod classify;
mod drift;
mod explain;
mod expressions;
mod impact;
mod output_usage;
mod value_flow;
mod walk;

pub use classify::{Action, ActionMap, ChangeClassifier, PlanSummary};
pub use drift::{DriftAnalyzer, DriftEntry, DriftResult};
pub use explain::{ExplainEngine, Explanation, ReasonType, RefactorWarning, render_path};
pub use expressions::{EntryKind, ExpressionIndex, IndexEntry};
pub use impact::{ImpactAnalyzer, ImpactClass, ImpactNode, ImpactResult, impact_class, severity_warnings};
pub use output_usage::{OutputUsageAnalyzer, OutputUsageResult, references_identifier};
pub use value_flow::{FlowKind, FlowStep, ValueFlowAnalyzer, ValueFlowExplanation, explain_value_flow};
