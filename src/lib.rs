// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # planlens
//!
//! Change-graph analysis for infrastructure-as-code plans.
//!
//! ## Overview
//!
//! planlens reads a machine-readable change plan and a textual dependency
//! graph and answers questions about them:
//!
//! - What is downstream of a resource, and how severe is each hit (impact)
//! - Which resources disagree with configuration or exist only in state (drift)
//! - Who consumes a module or output (output usage)
//! - Why a resource is affected, as a readable reference path (explain)
//! - Where an attribute value comes from (value flow)
//!
//! ## Architecture
//!
//! Every analysis is a pure function of its inputs:
//!
//! 1. **Inputs**: plan JSON, DOT graph text, optional provider schemas
//! 2. **Normalization**: graph labels resolved to plan addresses
//! 3. **Analyses**: run against the canonical graph and the expression index
//!
//! ## Modules
//!
//! - [`plan`]: Plan document types, drafts and resource summaries
//! - [`graph`]: DOT parsing, address resolution and the canonical graph
//! - [`analysis`]: Classification, impact, drift, output usage, explanations
//! - [`schema`]: Provider schema documents and the schema cache
//! - [`session`]: One-shot normalization serving every analysis
//! - [`source`]: Loading input documents
//! - [`config`]: Configuration parsing and validation
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! plan:
//!   path: out/plan.json
//!   graph: out/graph.dot
//!
//! analysis:
//!   distinguish_replacements: true
//!
//! drafts:
//!   - resource: aws_instance.web
//!     attribute: instance_type
//!     value: t3.large
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod plan;
pub mod schema;
pub mod session;
pub mod source;

// ============================================================================
// Re-exports
// ============================================================================

pub use analysis::{
    Action, ActionMap, ChangeClassifier, DriftAnalyzer, DriftResult, ExplainEngine, Explanation,
    ExpressionIndex, ImpactAnalyzer, ImpactResult, OutputUsageAnalyzer, OutputUsageResult,
    ValueFlowAnalyzer,
};
pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigParser, ConfigValidator, LensConfig, PlanHasher};
pub use error::{PlanLensError, Result};
pub use graph::{AddressResolver, Graph, GraphNormalizer};
pub use plan::{ChangePlan, DraftSet};
pub use schema::{ProviderSchemas, SchemaCache};
pub use session::{AnalysisReport, AnalysisSession};
pub use source::{LocalPlanSource, PlanSource};
