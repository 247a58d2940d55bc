//! Local file-based plan source.
//!
//! Reads the plan JSON, graph text and provider schema JSON produced by the
//! provisioning tool from the local filesystem.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::config::PlanSourceConfig;
use crate::error::{Result, SourceError};
use crate::plan::ChangePlan;
use crate::schema::ProviderSchemas;

use super::store::PlanSource;

/// Local file-based plan source.
#[derive(Debug, Clone)]
pub struct LocalPlanSource {
    /// Path to the plan JSON document.
    plan_path: PathBuf,
    /// Path to the graph text, if any.
    graph_path: Option<PathBuf>,
    /// Path to the provider schema JSON, if any.
    schemas_path: Option<PathBuf>,
}

impl LocalPlanSource {
    /// Creates a source reading only a plan document.
    #[must_use]
    pub fn new(plan_path: impl Into<PathBuf>) -> Self {
        Self {
            plan_path: plan_path.into(),
            graph_path: None,
            schemas_path: None,
        }
    }

    /// Creates a source from the `plan` configuration section.
    #[must_use]
    pub fn from_config(config: &PlanSourceConfig) -> Self {
        Self {
            plan_path: PathBuf::from(&config.path),
            graph_path: config.graph.as_ref().map(PathBuf::from),
            schemas_path: config.schemas.as_ref().map(PathBuf::from),
        }
    }

    /// Sets the graph text path.
    #[must_use]
    pub fn with_graph(mut self, path: impl Into<PathBuf>) -> Self {
        self.graph_path = Some(path.into());
        self
    }

    /// Sets the provider schema path.
    #[must_use]
    pub fn with_schemas(mut self, path: impl Into<PathBuf>) -> Self {
        self.schemas_path = Some(path.into());
        self
    }

    /// Gets the plan path.
    #[must_use]
    pub fn plan_path(&self) -> &Path {
        &self.plan_path
    }
}

/// Reads a whole file, mapping a missing file to [`SourceError::NotFound`].
async fn read_input(path: &Path) -> Result<String> {
    debug!("Reading {}", path.display());
    fs::read_to_string(path).await.map_err(|e| {
        let error = if e.kind() == ErrorKind::NotFound {
            SourceError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            SourceError::Unreadable {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        };
        error.into()
    })
}

#[async_trait]
impl PlanSource for LocalPlanSource {
    async fn load_plan(&self) -> Result<ChangePlan> {
        info!("Loading plan from: {}", self.plan_path.display());

        let content = read_input(&self.plan_path).await?;
        let plan: ChangePlan = serde_json::from_str(&content)
            .map_err(|e| SourceError::invalid_plan(format!("{}: {e}", self.plan_path.display())))?;

        debug!("Plan has {} resource changes", plan.resource_changes.len());
        Ok(plan)
    }

    async fn load_graph(&self) -> Result<String> {
        let Some(path) = &self.graph_path else {
            debug!("No graph configured, using an empty graph");
            return Ok(String::new());
        };

        info!("Loading graph from: {}", path.display());
        read_input(path).await
    }

    async fn load_schemas(&self) -> Result<Option<ProviderSchemas>> {
        let Some(path) = &self.schemas_path else {
            return Ok(None);
        };

        info!("Loading provider schemas from: {}", path.display());
        let content = read_input(path).await?;
        let value: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| SourceError::invalid_schemas(format!("{}: {e}", path.display())))?;
        let schemas = ProviderSchemas::from_value(value)
            .map_err(|e| SourceError::invalid_schemas(format!("{}: {e}", path.display())))?;

        Ok(Some(schemas))
    }

    fn source_type(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanLensError;
    use tempfile::TempDir;

    const PLAN: &str = r#"{
        "format_version": "1.2",
        "resource_changes": [
            { "address": "aws_s3_bucket.logs", "change": { "actions": ["create"] } }
        ]
    }"#;

    const GRAPH: &str = r#"digraph {
        "[root] aws_s3_bucket.logs (expand)" -> "[root] provider[\"registry.terraform.io/hashicorp/aws\"]"
    }"#;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write fixture");
        path
    }

    #[tokio::test]
    async fn test_load_all_documents() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let source = LocalPlanSource::new(write(&dir, "plan.json", PLAN))
            .with_graph(write(&dir, "graph.dot", GRAPH))
            .with_schemas(write(&dir, "schemas.json", r#"{"provider_schemas": {}}"#));

        let plan = source.load_plan().await.expect("Failed to load plan");
        assert_eq!(plan.resource_changes.len(), 1);
        assert_eq!(plan.format_version.as_deref(), Some("1.2"));

        let graph = source.load_graph().await.expect("Failed to load graph");
        assert!(graph.contains("aws_s3_bucket.logs"));

        let schemas = source.load_schemas().await.expect("Failed to load schemas");
        assert!(schemas.is_some());
    }

    #[tokio::test]
    async fn test_schemas_keep_provider_document_order() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let source = LocalPlanSource::new(write(&dir, "plan.json", PLAN)).with_schemas(write(
            &dir,
            "schemas.json",
            r#"{"provider_schemas": {
                "registry/zzz": { "resource_schemas": { "aws_instance": { "version": 1 } } },
                "registry/aaa": { "resource_schemas": { "aws_instance": { "version": 2 } } }
            }}"#,
        ));

        let schemas = source
            .load_schemas()
            .await
            .expect("Failed to load schemas")
            .expect("Schemas should be configured");
        let providers: Vec<&str> = schemas.provider_schemas.keys().map(String::as_str).collect();
        assert_eq!(providers, vec!["registry/zzz", "registry/aaa"]);
    }

    #[tokio::test]
    async fn test_missing_optional_documents() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let source: Box<dyn PlanSource> = Box::new(LocalPlanSource::new(write(&dir, "plan.json", PLAN)));

        assert_eq!(source.source_type(), "local");
        assert!(source.load_graph().await.expect("graph").is_empty());
        assert!(source.load_schemas().await.expect("schemas").is_none());
    }

    #[tokio::test]
    async fn test_missing_plan() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let source = LocalPlanSource::new(dir.path().join("absent.json"));

        let err = source.load_plan().await.expect_err("Load should fail");
        assert!(matches!(err, PlanLensError::Source(SourceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_invalid_documents() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let source = LocalPlanSource::new(write(&dir, "plan.json", "not json"))
            .with_schemas(write(&dir, "schemas.json", r#"{"provider_schemas": []}"#));

        let err = source.load_plan().await.expect_err("Plan should be invalid");
        assert!(err.is_input_error());

        let err = source.load_schemas().await.expect_err("Schemas should be invalid");
        assert!(matches!(err, PlanLensError::Source(SourceError::InvalidSchemas { .. })));
    }
}
