//! Model-backed agent with tools and middleware.

use std::sync::Arc;

use futures::StreamExt;
use tracing::debug;

use super::engine::AgentLoop;
use super::invocation::Invocation;
use super::resume;
use super::Agent;
use crate::config::{AgentryConfig, DEFAULT_MAX_ITERATIONS};
use crate::context::RunContext;
use crate::error::{AgentryError, Result};
use crate::middleware::{chain, Chain, Middleware};
use crate::provider::ModelProvider;
use crate::stream::{self, MessageStream};
use crate::tools::{Tool, ToolRegistry, ToolResolver};

/// Immutable agent configuration shared with the loop handler.
pub(crate) struct AgentCore {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) instruction: Option<String>,
    pub(crate) provider: Arc<dyn ModelProvider>,
    pub(crate) tools: ToolRegistry,
    pub(crate) resolver: Option<Arc<dyn ToolResolver>>,
    pub(crate) middleware: Chain,
    pub(crate) max_iterations: usize,
    pub(crate) input_schema: Option<serde_json::Value>,
    pub(crate) output_schema: Option<serde_json::Value>,
}

/// An agent that drives a [`ModelProvider`] until it produces a final answer.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use agentry::prelude::*;
/// # fn example(provider: Arc<dyn ModelProvider>) -> agentry::error::Result<()> {
/// let agent = LlmAgent::builder("geographer")
///     .with_instruction("Answer with a single city name.")
///     .with_provider(provider)
///     .with_middleware(Arc::new(Logging))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LlmAgent {
    core: Arc<AgentCore>,
}

impl LlmAgent {
    pub fn builder(name: impl Into<String>) -> LlmAgentBuilder {
        LlmAgentBuilder::new(name)
    }

    pub fn max_iterations(&self) -> usize {
        self.core.max_iterations
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.core.tools
    }
}

impl Agent for LlmAgent {
    fn name(&self) -> &str {
        &self.core.name
    }

    fn description(&self) -> &str {
        &self.core.description
    }

    fn run(&self, ctx: RunContext, invocation: Invocation) -> MessageStream {
        let core = self.core.clone();
        let ctx = ctx.with_agent(core.name.clone());
        Box::pin(async_stream::stream! {
            if invocation.resumable {
                if let Some(session) = &invocation.session {
                    match session.history().await {
                        Ok(history) => {
                            if let Some(done) = resume::find_completed(&history, &invocation.id, &core.name) {
                                debug!(
                                    invocation_id = %invocation.id,
                                    agent = %core.name,
                                    "invocation already completed; resuming from session"
                                );
                                yield Ok(done);
                                return;
                            }
                        }
                        Err(error) => {
                            yield Err(error);
                            return;
                        }
                    }
                }
            }

            let handler = core.middleware.wrap(Arc::new(AgentLoop { core: core.clone() }));
            let mut inner = stream::terminate_on_error(handler.handle(ctx, invocation));
            while let Some(item) = inner.next().await {
                yield item;
            }
        })
    }
}

impl std::fmt::Debug for LlmAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmAgent")
            .field("name", &self.core.name)
            .field("provider", &self.core.provider.name())
            .field("tools", &self.core.tools)
            .field("middleware", &self.core.middleware.len())
            .field("max_iterations", &self.core.max_iterations)
            .finish()
    }
}

/// Builder for [`LlmAgent`]; configuration errors surface from [`build`](Self::build).
pub struct LlmAgentBuilder {
    name: String,
    description: String,
    instruction: Option<String>,
    provider: Option<Arc<dyn ModelProvider>>,
    tools: Vec<Arc<dyn Tool>>,
    resolver: Option<Arc<dyn ToolResolver>>,
    middlewares: Vec<Arc<dyn Middleware>>,
    max_iterations: Option<usize>,
    config: Option<AgentryConfig>,
    input_schema: Option<serde_json::Value>,
    output_schema: Option<serde_json::Value>,
}

impl LlmAgentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            instruction: None,
            provider: None,
            tools: Vec::new(),
            resolver: None,
            middlewares: Vec::new(),
            max_iterations: None,
            config: None,
            input_schema: None,
            output_schema: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn ModelProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Resolve extra tools once per invocation (e.g., from a remote server).
    pub fn with_resolver(mut self, resolver: Arc<dyn ToolResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Append a middleware; earlier middlewares wrap later ones.
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Take defaults (currently `max_iterations`) from a config.
    pub fn with_config(mut self, config: &AgentryConfig) -> Self {
        self.config = Some(config.clone());
        self
    }

    pub fn with_input_schema(mut self, schema: serde_json::Value) -> Self {
        self.input_schema = Some(schema);
        self
    }

    pub fn with_output_schema(mut self, schema: serde_json::Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn build(self) -> Result<LlmAgent> {
        let provider = self.provider.ok_or_else(|| {
            AgentryError::Configuration(format!("agent '{}' has no model provider", self.name))
        })?;
        if self.name.trim().is_empty() {
            return Err(AgentryError::Configuration("agent name must not be empty".into()));
        }
        let max_iterations = self
            .max_iterations
            .or_else(|| self.config.as_ref().map(|c| c.max_iterations))
            .unwrap_or(DEFAULT_MAX_ITERATIONS);
        if max_iterations == 0 {
            return Err(AgentryError::Configuration(
                "max_iterations must be at least 1".into(),
            ));
        }

        Ok(LlmAgent {
            core: Arc::new(AgentCore {
                name: self.name,
                description: self.description,
                instruction: self.instruction,
                provider,
                tools: ToolRegistry::new(self.tools)?,
                resolver: self.resolver,
                middleware: chain(self.middlewares),
                max_iterations,
                input_schema: self.input_schema,
                output_schema: self.output_schema,
            }),
        })
    }
}
