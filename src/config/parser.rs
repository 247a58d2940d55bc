//! Configuration parser for loading `planlens.yaml`.
//!
//! This module handles loading configuration from YAML files and environment
//! variables, with proper precedence and error handling.

use crate::error::{ConfigError, PlanLensError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::spec::LensConfig;

/// Environment variable overriding `plan.path`.
pub const ENV_PLAN: &str = "PLANLENS_PLAN";
/// Environment variable overriding `plan.graph`.
pub const ENV_GRAPH: &str = "PLANLENS_GRAPH";
/// Environment variable overriding `plan.schemas`.
pub const ENV_SCHEMAS: &str = "PLANLENS_SCHEMAS";

/// Configuration parser.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving relative paths and `.env`.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// Relative document paths are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<LensConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(PlanLensError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            PlanLensError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        let mut config = self.parse_yaml(&content, Some(path))?;
        if let Some(dir) = path.parent() {
            resolve_paths(&mut config, dir);
        }
        Ok(config)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<LensConfig> {
        debug!("Parsing YAML configuration");

        let config: LensConfig = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            PlanLensError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        debug!(
            "Parsed configuration for plan '{}' with {} drafts",
            config.plan.path,
            config.drafts.len()
        );
        Ok(config)
    }

    /// Loads configuration with environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<LensConfig> {
        let mut config = self.load_file(path)?;
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Applies `PLANLENS_*` environment variable overrides.
    pub fn apply_env_overrides(config: &mut LensConfig) {
        if let Ok(plan) = std::env::var(ENV_PLAN) {
            debug!("Overriding plan.path from environment");
            config.plan.path = plan;
        }

        if let Ok(graph) = std::env::var(ENV_GRAPH) {
            debug!("Overriding plan.graph from environment");
            config.plan.graph = Some(graph);
        }

        if let Ok(schemas) = std::env::var(ENV_SCHEMAS) {
            debug!("Overriding plan.schemas from environment");
            config.plan.schemas = Some(schemas);
        }
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                PlanLensError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Resolves relative document paths against `base`.
fn resolve_paths(config: &mut LensConfig, base: &Path) {
    let resolve = |p: &str| -> String {
        if p.is_empty() || Path::new(p).is_absolute() {
            p.to_string()
        } else {
            base.join(p).display().to_string()
        }
    };

    config.plan.path = resolve(&config.plan.path);
    config.plan.graph = config.plan.graph.as_deref().map(resolve);
    config.plan.schemas = config.plan.schemas.as_deref().map(resolve);
}

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["planlens.yaml", "planlens.yml", ".planlens.yaml"];

/// Finds the configuration file in the given directory or its parents,
/// then in the user configuration directory.
///
/// # Errors
///
/// Returns an error if no configuration file is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        if let Some(found) = find_in_dir(&current) {
            return Ok(found);
        }

        if !current.pop() {
            break;
        }
    }

    if let Some(found) = dirs::config_dir()
        .map(|dir| dir.join("planlens"))
        .and_then(|dir| find_in_dir(&dir))
    {
        return Ok(found);
    }

    Err(PlanLensError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONFIG_FILES[0]),
    }))
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_FILES
        .iter()
        .map(|filename| dir.join(filename))
        .find(|path| path.exists())
        .inspect(|path| info!("Found configuration file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r"
plan:
  path: plan.json
";
        let parser = ConfigParser::new();
        let result = parser.parse_yaml(yaml, None);
        assert!(result.is_ok());

        let config = result.unwrap();
        assert_eq!(config.plan.path, "plan.json");
        assert!(config.analysis.max_traversal_nodes.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r"
plan:
  path: out/plan.json
  graph: out/graph.dot
  schemas: out/schemas.json

analysis:
  warn_on_ambiguous_resolution: true
  distinguish_replacements: true
  max_traversal_nodes: 500

drafts:
  - resource: aws_instance.web
    attribute: instance_type
    old_value: t3.micro
    value: t3.large
";
        let config = ConfigParser::new().parse_yaml(yaml, None).unwrap();
        assert_eq!(config.plan.graph.as_deref(), Some("out/graph.dot"));
        assert!(config.analysis.warn_on_ambiguous_resolution);
        assert_eq!(config.analysis.max_traversal_nodes, Some(500));
        assert_eq!(config.drafts.len(), 1);
    }

    #[test]
    fn test_invalid_yaml() {
        let err = ConfigParser::new()
            .parse_yaml("plan: [unterminated", None)
            .unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_load_file_resolves_relative_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("planlens.yaml");
        std::fs::write(&path, "plan:\n  path: plan.json\n  graph: /abs/graph.dot\n").unwrap();

        let config = ConfigParser::new().load_file(&path).unwrap();
        assert_eq!(
            config.plan.path,
            dir.path().join("plan.json").display().to_string()
        );
        assert_eq!(config.plan.graph.as_deref(), Some("/abs/graph.dot"));
    }

    #[test]
    fn test_find_config_in_parent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("planlens.yaml"), "plan:\n  path: p.json\n").unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, dir.path().join("planlens.yaml"));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = ConfigParser::new()
            .load_file(dir.path().join("nope.yaml"))
            .unwrap_err();
        assert!(matches!(err, PlanLensError::Config(ConfigError::FileNotFound { .. })));
    }
}
