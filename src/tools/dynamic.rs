//! Runtime-discovered tools (e.g., remote tool servers).

use std::sync::Arc;

use async_trait::async_trait;

use super::tool::{Tool, ToolContext};
use super::types::ToolSchema;
use crate::context::RunContext;
use crate::error::Result;

/// Resolves additional tools once per invocation.
///
/// A resolution failure aborts the invocation before any model call.
#[async_trait]
pub trait ToolResolver: Send + Sync {
    async fn resolve(&self, ctx: &RunContext) -> Result<Vec<Arc<dyn Tool>>>;
}

/// A tool advertised by a [`DynamicToolProvider`].
#[derive(Debug, Clone)]
pub struct DynamicTool {
    pub name: String,
    pub description: String,
    pub schema: ToolSchema,
}

/// A source that lists tools and executes them by name.
#[async_trait]
pub trait DynamicToolProvider: Send + Sync {
    async fn list_tools(&self, ctx: &RunContext) -> Result<Vec<DynamicTool>>;

    async fn execute_tool(&self, name: &str, ctx: &ToolContext, input: &str) -> Result<String>;
}

/// Exposes a [`DynamicTool`] through the [`Tool`] trait.
pub struct DynamicToolAdapter {
    provider: Arc<dyn DynamicToolProvider>,
    tool: DynamicTool,
}

impl DynamicToolAdapter {
    pub fn new(provider: Arc<dyn DynamicToolProvider>, tool: DynamicTool) -> Self {
        Self { provider, tool }
    }
}

#[async_trait]
impl Tool for DynamicToolAdapter {
    fn name(&self) -> &str {
        &self.tool.name
    }

    fn description(&self) -> &str {
        &self.tool.description
    }

    fn input_schema(&self) -> &ToolSchema {
        &self.tool.schema
    }

    async fn handle(&self, ctx: &ToolContext, input: &str) -> Result<String> {
        self.provider.execute_tool(&self.tool.name, ctx, input).await
    }
}

/// [`ToolResolver`] backed by a [`DynamicToolProvider`].
pub struct ProviderToolResolver {
    provider: Arc<dyn DynamicToolProvider>,
}

impl ProviderToolResolver {
    pub fn new(provider: Arc<dyn DynamicToolProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ToolResolver for ProviderToolResolver {
    async fn resolve(&self, ctx: &RunContext) -> Result<Vec<Arc<dyn Tool>>> {
        let listed = self.provider.list_tools(ctx).await?;
        Ok(listed
            .into_iter()
            .map(|tool| {
                Arc::new(DynamicToolAdapter::new(self.provider.clone(), tool)) as Arc<dyn Tool>
            })
            .collect())
    }
}
