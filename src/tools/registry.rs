//! Name-indexed tool set combining static and resolved tools.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::dynamic::ToolResolver;
use super::tool::Tool;
use crate::context::RunContext;
use crate::error::{AgentryError, Result};
use crate::provider::ToolDefinition;

static TOOL_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("tool name validation regex must compile")
});

/// Ordered tool set with unique, provider-safe names.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Build a registry, rejecting invalid or duplicate names.
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Result<Self> {
        let mut registry = Self::default();
        for tool in tools {
            let name = tool.name().to_string();
            if !TOOL_NAME_RE.is_match(&name) {
                return Err(AgentryError::Configuration(format!(
                    "invalid tool name '{name}'"
                )));
            }
            if registry.index.contains_key(&name) {
                return Err(AgentryError::Configuration(format!(
                    "duplicate tool name '{name}'"
                )));
            }
            registry.index.insert(name, registry.tools.len());
            registry.tools.push(tool);
        }
        Ok(registry)
    }

    /// Combine with resolved tools; a resolved tool replaces a static one of
    /// the same name.
    pub fn merge(&self, resolved: Vec<Arc<dyn Tool>>) -> Result<Self> {
        let resolved = Self::new(resolved)?;
        let mut tools: Vec<Arc<dyn Tool>> = self
            .tools
            .iter()
            .filter(|tool| !resolved.index.contains_key(tool.name()))
            .cloned()
            .collect();
        tools.extend(resolved.tools);
        Self::new(tools)
    }

    /// Snapshot for one invocation: static tools plus whatever the resolver
    /// returns.
    pub async fn resolve(
        &self,
        resolver: Option<&dyn ToolResolver>,
        ctx: &RunContext,
    ) -> Result<Self> {
        match resolver {
            Some(resolver) => self.merge(resolver.resolve(ctx).await?),
            None => Ok(self.clone()),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|idx| self.tools[*idx].clone())
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{AgentTool, ToolSchema};
    use async_trait::async_trait;

    fn named(name: &str, reply: &'static str) -> Arc<dyn Tool> {
        Arc::new(AgentTool::new(name, "test tool", ToolSchema::empty(), move |_, _| async move {
            Ok(serde_json::json!(reply))
        }))
    }

    struct FixedResolver(Vec<Arc<dyn Tool>>);

    #[async_trait]
    impl ToolResolver for FixedResolver {
        async fn resolve(&self, _ctx: &RunContext) -> Result<Vec<Arc<dyn Tool>>> {
            Ok(self.0.clone())
        }
    }

    struct FailingResolver;

    #[async_trait]
    impl ToolResolver for FailingResolver {
        async fn resolve(&self, _ctx: &RunContext) -> Result<Vec<Arc<dyn Tool>>> {
            Err(AgentryError::provider("mcp", "server unreachable"))
        }
    }

    #[test]
    fn rejects_duplicate_and_invalid_names() {
        let dup = ToolRegistry::new(vec![named("a", "1"), named("a", "2")]);
        assert!(matches!(dup, Err(AgentryError::Configuration(_))));

        let invalid = ToolRegistry::new(vec![named("has space", "1")]);
        assert!(matches!(invalid, Err(AgentryError::Configuration(_))));
    }

    #[tokio::test]
    async fn resolved_tools_override_static_tools() {
        let registry = ToolRegistry::new(vec![named("a", "static"), named("b", "static")])
            .expect("registry");
        let resolver = FixedResolver(vec![named("b", "resolved"), named("c", "resolved")]);

        let merged = registry
            .resolve(Some(&resolver), &RunContext::new())
            .await
            .expect("resolve");

        assert_eq!(merged.names(), vec!["a", "b", "c"]);
        let output = merged
            .get("b")
            .expect("tool b")
            .handle(&Default::default(), "")
            .await
            .expect("handle");
        assert_eq!(output, "resolved");
    }

    #[tokio::test]
    async fn resolver_failure_propagates() {
        let registry = ToolRegistry::default();
        let err = registry
            .resolve(Some(&FailingResolver), &RunContext::new())
            .await
            .expect_err("should fail");
        assert!(err.to_string().contains("server unreachable"));
    }
}
