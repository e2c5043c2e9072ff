//! Model provider contract.
//!
//! Vendor adapters live outside this crate; they implement [`ModelProvider`]
//! and translate [`ModelRequest`] / [`ModelResponse`] to their wire format.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::context::RunContext;
use crate::error::Result;
use crate::types::{Message, MessageStatus};

/// Lazy sequence of responses produced by a streaming provider call.
pub type ModelResponseStream = BoxStream<'static, Result<ModelResponse>>;

/// A request sent to a model provider.
#[derive(Debug, Clone, Default)]
pub struct ModelRequest {
    pub instruction: Option<String>,
    /// History followed by the new input and any tool rounds so far.
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub input_schema: Option<serde_json::Value>,
    pub output_schema: Option<serde_json::Value>,
}

/// Tool definition sent to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Response from a provider: exactly one message.
///
/// The message's role and status drive the engine's next action: a `tool`
/// role requests tool execution, `completed` marks the final chunk of a
/// streaming call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub message: Message,
}

impl ModelResponse {
    pub fn new(message: Message) -> Self {
        Self { message }
    }
}

impl From<Message> for ModelResponse {
    fn from(message: Message) -> Self {
        Self::new(message)
    }
}

/// Core trait implemented by model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "openai"), used in logs and errors.
    fn name(&self) -> &str;

    /// Generate one response (non-streaming).
    async fn generate(&self, ctx: &RunContext, request: &ModelRequest) -> Result<ModelResponse>;

    /// Generate incrementally.
    ///
    /// Chunks that are not `completed` are partial output; the `completed`
    /// chunk carries the full response. The default implementation wraps
    /// [`ModelProvider::generate`] as a single completed chunk.
    async fn new_stream(
        &self,
        ctx: &RunContext,
        request: &ModelRequest,
    ) -> Result<ModelResponseStream> {
        let mut response = self.generate(ctx, request).await?;
        response.message.status = MessageStatus::Completed;
        Ok(Box::pin(futures::stream::once(async move { Ok(response) })))
    }
}
