//! Graph normalization.
//!
//! This module turns the textual graph emitted by the provisioning tool into
//! a canonical graph keyed by plan addresses:
//! - Parsing quoted edge statements from the text
//! - Resolving decorated node labels to plan addresses
//! - Building the deduplicated canonical graph and its traversal helpers

mod canonical;
mod dot;
mod resolve;

pub use canonical::{CanonicalGraph, Graph};
pub use dot::{Edge, GraphNormalizer, RawGraph};
pub use resolve::{AddressResolver, MatchRule, Resolution};
