//! Configuration validation.
//!
//! Checks a loaded configuration for values that would make every analysis
//! meaningless, and warns about values that are merely suspicious.

use crate::error::{ConfigError, PlanLensError, Result};
use std::collections::HashSet;
use tracing::debug;

use super::spec::{AnalysisSettings, DraftConfig, LensConfig, PlanSourceConfig};
use crate::plan::DraftSource;

/// Validator for planlens configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator {
    /// Treat warnings as errors.
    strict: bool,
}

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self { strict: false }
    }

    /// Makes warnings fail validation.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Validates a configuration.
    ///
    /// # Errors
    ///
    /// Returns the first error if validation fails, or the first warning in
    /// strict mode.
    pub fn validate(&self, config: &LensConfig) -> Result<ValidationResult> {
        let result = Self::check(config);

        if let Some(first_error) = result.errors.first() {
            Err(PlanLensError::Config(ConfigError::ValidationError {
                message: first_error.message.clone(),
                field: Some(first_error.field.clone()),
            }))
        } else if let Some(warning) = result.warnings.first().filter(|_| self.strict) {
            Err(PlanLensError::Config(ConfigError::validation_general(
                warning.clone(),
            )))
        } else {
            debug!("Configuration validation passed");
            Ok(result)
        }
    }

    /// Collects every error and warning without failing.
    #[must_use]
    pub fn check(config: &LensConfig) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_plan(&config.plan, &mut result);
        Self::validate_analysis(&config.analysis, &mut result);
        Self::validate_drafts(&config.drafts, &mut result);

        result
    }

    fn validate_plan(plan: &PlanSourceConfig, result: &mut ValidationResult) {
        if plan.path.trim().is_empty() {
            result.errors.push(ValidationError {
                field: String::from("plan.path"),
                message: String::from("Plan path cannot be empty"),
            });
        }

        match plan.graph.as_deref() {
            None => result.warnings.push(String::from(
                "plan.graph: No graph configured; impact and usage analyses will find no dependents",
            )),
            Some(graph) if graph.trim().is_empty() => result.errors.push(ValidationError {
                field: String::from("plan.graph"),
                message: String::from("Graph path cannot be empty when set"),
            }),
            Some(_) => {}
        }

        if plan.schemas.as_deref().is_some_and(|s| s.trim().is_empty()) {
            result.errors.push(ValidationError {
                field: String::from("plan.schemas"),
                message: String::from("Schemas path cannot be empty when set"),
            });
        }
    }

    fn validate_analysis(analysis: &AnalysisSettings, result: &mut ValidationResult) {
        if analysis.max_traversal_nodes == Some(0) {
            result.errors.push(ValidationError {
                field: String::from("analysis.max_traversal_nodes"),
                message: String::from("Node budget must be at least 1"),
            });
        }
    }

    fn validate_drafts(drafts: &[DraftConfig], result: &mut ValidationResult) {
        let mut seen = HashSet::new();

        for (i, draft) in drafts.iter().enumerate() {
            let prefix = format!("drafts[{i}]");

            if draft.resource.trim().is_empty() {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.resource"),
                    message: String::from("Draft resource cannot be empty"),
                });
            } else if draft.source == DraftSource::Resource && !is_address_like(&draft.resource) {
                result.warnings.push(format!(
                    "{prefix}.resource: '{}' does not look like a resource address",
                    draft.resource
                ));
            }

            if draft.attribute.trim().is_empty() {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.attribute"),
                    message: String::from("Draft attribute cannot be empty"),
                });
            }

            if !seen.insert((draft.resource.as_str(), draft.attribute.as_str())) {
                result.warnings.push(format!(
                    "{prefix}: Duplicate draft for {}.{}; the last one wins",
                    draft.resource, draft.attribute
                ));
            }
        }
    }
}

/// Returns true if the string looks like `type.name`, optionally inside
/// `module.<name>.` prefixes.
fn is_address_like(address: &str) -> bool {
    let segments: Vec<&str> = address.split('.').collect();
    if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
        return false;
    }

    segments.iter().all(|segment| {
        segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '[' | ']' | '"'))
    })
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigParser;

    fn parse(yaml: &str) -> LensConfig {
        ConfigParser::new().parse_yaml(yaml, None).unwrap()
    }

    #[test]
    fn test_valid_config() {
        let config = parse(
            r"
plan:
  path: plan.json
  graph: graph.dot
drafts:
  - resource: module.app.aws_instance.web
    attribute: instance_type
    value: t3.large
",
        );
        let result = ConfigValidator::new().validate(&config).unwrap();
        assert!(result.is_valid());
        assert_eq!(result.warning_count(), 0);
    }

    #[test]
    fn test_errors() {
        let config = parse(
            r"
plan:
  path: ''
  graph: ' '
analysis:
  max_traversal_nodes: 0
drafts:
  - resource: ''
    attribute: ''
",
        );
        let result = ConfigValidator::check(&config);
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "plan.path",
                "plan.graph",
                "analysis.max_traversal_nodes",
                "drafts[0].resource",
                "drafts[0].attribute",
            ]
        );
        assert!(ConfigValidator::new().validate(&config).is_err());
    }

    #[test]
    fn test_warnings() {
        let config = parse(
            r"
plan:
  path: plan.json
drafts:
  - resource: web
    attribute: ami
  - resource: web
    attribute: ami
  - resource: region
    attribute: default
    source: variable
",
        );
        let result = ConfigValidator::new().validate(&config).unwrap();
        assert_eq!(result.warning_count(), 4);
        assert!(ConfigValidator::new().with_strict(true).validate(&config).is_err());
    }

    #[test]
    fn test_address_like() {
        assert!(is_address_like("aws_instance.web"));
        assert!(is_address_like("module.net.aws_subnet.a[\"x\"]"));
        assert!(!is_address_like("web"));
        assert!(!is_address_like("aws_instance..web"));
    }
}
