//! Tool system for function calling.

pub mod arguments;
pub mod dynamic;
pub mod registry;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use dynamic::{DynamicTool, DynamicToolAdapter, DynamicToolProvider, ProviderToolResolver, ToolResolver};
pub use registry::ToolRegistry;
pub use tool::{AgentTool, Tool, ToolContext};
pub use types::{SchemaBuilder, ToolSchema};
