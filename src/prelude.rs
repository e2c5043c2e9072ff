//! Convenience re-exports for common use.

pub use crate::agent::{Agent, Invocation, LlmAgent};
pub use crate::config::AgentryConfig;
pub use crate::context::RunContext;
pub use crate::error::{AgentryError, Result};
pub use crate::middleware::{Handler, Logging, Middleware, Retry};
pub use crate::provider::{ModelProvider, ModelRequest, ModelResponse};
pub use crate::runner::{RunOptions, Runner};
pub use crate::session::{InMemorySession, Session};
pub use crate::stream::MessageStream;
pub use crate::tools::{AgentTool, Tool, ToolArguments, ToolContext, ToolSchema};
pub use crate::types::{Message, MessageStatus, Part, Role, ToolPart};
