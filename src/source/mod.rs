//! Input document sources.
//!
//! This module loads the documents an analysis runs on. The analysis core
//! itself never performs IO.

mod local;
mod store;

pub use local::LocalPlanSource;
pub use store::PlanSource;
