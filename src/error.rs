//! Error types for the planlens analysis tool.
//!
//! The analysis core never fails: malformed or partial inputs degrade to
//! empty results. Errors only arise at the edges, while loading
//! configuration or reading plan, graph and schema documents.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for planlens.
#[derive(Debug, Error)]
pub enum PlanLensError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors while loading plan, graph or schema documents.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A requested address, type or identifier does not exist in the inputs.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// A required setting was neither configured nor passed on the command line.
    #[error("Missing setting: {name}")]
    MissingSetting {
        /// Name of the missing setting.
        name: String,
    },
}

/// Errors raised while loading input documents.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Input file not found.
    #[error("Input file not found: {path}")]
    NotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Input file exists but could not be read.
    #[error("Failed to read {path}: {message}")]
    Unreadable {
        /// Path of the file.
        path: PathBuf,
        /// Description of the read failure.
        message: String,
    },

    /// The plan document is not valid JSON or does not match the plan shape.
    #[error("Invalid plan document: {message}")]
    InvalidPlan {
        /// Description of the parse failure.
        message: String,
    },

    /// The provider schema document could not be parsed.
    #[error("Invalid provider schema document: {message}")]
    InvalidSchemas {
        /// Description of the parse failure.
        message: String,
    },
}

/// Result type alias for planlens operations.
pub type Result<T> = std::result::Result<T, PlanLensError>;

impl PlanLensError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Creates a new not-found error for a lookup by the user.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Returns true if the error was caused by user-supplied input
    /// rather than the environment.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Config(ConfigError::ParseError { .. } | ConfigError::ValidationError { .. })
                | Self::NotFound(_)
                | Self::Source(SourceError::InvalidPlan { .. } | SourceError::InvalidSchemas { .. })
        )
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a validation error without a specific field.
    #[must_use]
    pub fn validation_general(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a missing-setting error.
    #[must_use]
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingSetting { name: name.into() }
    }
}

impl SourceError {
    /// Creates an invalid-plan error with the given message.
    #[must_use]
    pub fn invalid_plan(message: impl Into<String>) -> Self {
        Self::InvalidPlan {
            message: message.into(),
        }
    }

    /// Creates an invalid-schemas error with the given message.
    #[must_use]
    pub fn invalid_schemas(message: impl Into<String>) -> Self {
        Self::InvalidSchemas {
            message: message.into(),
        }
    }
}
