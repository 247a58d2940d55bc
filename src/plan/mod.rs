//! Change-plan data model.
//!
//! This module holds the plan document types consumed by every analysis,
//! the draft set used for what-if impact runs, and per-resource display
//! summaries.

mod drafts;
mod resource;
mod types;

pub use drafts::{Draft, DraftSet, DraftSource};
pub use resource::{
    annotate_risks, category_label, describe_rules, is_editable_field, render_block_value,
    ResourceSummary,
};
pub use types::{
    Change, ChangePlan, ConfigModule, ConfigOutput, ConfigResource, Configuration, Expression,
    ModuleCall, PriorState, RawAction, ResourceChange, StateModule, StateResource, StateValues,
};
