//! Tool trait and closure-based tool wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use super::arguments::ToolArguments;
use super::types::ToolSchema;
use crate::context::RunContext;
use crate::error::Result;
use crate::provider::ToolDefinition;

/// Context scoped to a single tool call.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    /// Id of the tool-invocation part being executed.
    pub call_id: String,
    pub tool_name: String,
    pub invocation_id: String,
    pub agent: String,
    pub session_id: Option<String>,
    /// Canceled when the invocation is canceled or a sibling call fails.
    pub run: RunContext,
}

/// Core tool trait: a named capability with serialized input and output.
///
/// Tools are stateless with respect to the engine; side effects are the
/// implementation's concern.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the model calls).
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn input_schema(&self) -> &ToolSchema;

    /// Execute with serialized arguments, returning the serialized result.
    async fn handle(&self, ctx: &ToolContext, input: &str) -> Result<String>;

    /// Definition advertised to the model.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema().as_value().clone(),
        }
    }
}

type ToolHandler = dyn Fn(ToolArguments, ToolContext) -> Pin<Box<dyn Future<Output = Result<serde_json::Value>> + Send>>
    + Send
    + Sync;

/// Closure-based tool.
///
/// Arguments are parsed into [`ToolArguments`]; a string result is returned
/// verbatim, any other JSON value is serialized.
pub struct AgentTool {
    name: String,
    description: String,
    schema: ToolSchema,
    handler: Arc<ToolHandler>,
}

impl AgentTool {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: ToolSchema,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments, ToolContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            handler: Arc::new(move |args, ctx| Box::pin(handler(args, ctx))),
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> &ToolSchema {
        &self.schema
    }

    async fn handle(&self, ctx: &ToolContext, input: &str) -> Result<String> {
        let args = ToolArguments::parse(input)?;
        match (self.handler)(args, ctx.clone()).await? {
            serde_json::Value::String(text) => Ok(text),
            other => Ok(serde_json::to_string(&other)?),
        }
    }
}

impl std::fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closure_tool_sees_call_context_and_serializes_result() {
        let tool = AgentTool::new(
            "echo",
            "Echo arguments",
            ToolSchema::object().string("text", "Text", true).build(),
            |args, ctx| async move {
                Ok(serde_json::json!({
                    "text": args.get_str("text")?,
                    "call": ctx.call_id,
                }))
            },
        );
        let ctx = ToolContext {
            call_id: "call-7".into(),
            tool_name: "echo".into(),
            ..ToolContext::default()
        };

        let output = tool.handle(&ctx, r#"{"text":"hi"}"#).await.expect("handle");
        let value: serde_json::Value = serde_json::from_str(&output).expect("json output");
        assert_eq!(value, serde_json::json!({"text": "hi", "call": "call-7"}));
        assert_eq!(tool.definition().name, "echo");
    }

    #[tokio::test]
    async fn string_results_are_returned_verbatim() {
        let tool = AgentTool::new("one", "Returns 1", ToolSchema::empty(), |_, _| async {
            Ok(serde_json::json!("1"))
        });
        let output = tool
            .handle(&ToolContext::default(), "")
            .await
            .expect("handle");
        assert_eq!(output, "1");
    }
}
