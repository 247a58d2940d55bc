//! Configuration module for planlens.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `planlens.yaml`
//! - Validation of configuration values
//! - Fingerprinting analysis inputs for memoization

mod hash;
mod parser;
mod spec;
mod validator;

pub use hash::PlanHasher;
pub use parser::{ConfigParser, DEFAULT_CONFIG_FILES, ENV_GRAPH, ENV_PLAN, ENV_SCHEMAS, find_config_file};
pub use spec::{AnalysisSettings, DraftConfig, LensConfig, PlanSourceConfig};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};
