//! Plan source trait definition.
//!
//! A plan source supplies the three input documents of an analysis: the
//! change plan, the dependency graph text and, optionally, provider schemas.

use async_trait::async_trait;

use crate::error::Result;
use crate::plan::ChangePlan;
use crate::schema::ProviderSchemas;

/// Trait for input document sources.
#[async_trait]
pub trait PlanSource: Send + Sync {
    /// Loads and parses the change plan.
    async fn load_plan(&self) -> Result<ChangePlan>;

    /// Loads the raw dependency graph text.
    ///
    /// Returns an empty string when the source has no graph.
    async fn load_graph(&self) -> Result<String>;

    /// Loads provider schemas, if the source has any.
    async fn load_schemas(&self) -> Result<Option<ProviderSchemas>>;

    /// Gets the source type name.
    fn source_type(&self) -> &'static str;
}

#[async_trait]
impl PlanSource for Box<dyn PlanSource> {
    async fn load_plan(&self) -> Result<ChangePlan> {
        (**self).load_plan().await
    }

    async fn load_graph(&self) -> Result<String> {
        (**self).load_graph().await
    }

    async fn load_schemas(&self) -> Result<Option<ProviderSchemas>> {
        (**self).load_schemas().await
    }

    fn source_type(&self) -> &'static str {
        (**self).source_type()
    }
}
