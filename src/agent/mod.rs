//! Agents and the invocation engine.

mod engine;
pub mod invocation;
pub mod llm_agent;
mod resume;
pub mod tool_phase;

pub use invocation::{new_invocation_id, Invocation};
pub use llm_agent::{LlmAgent, LlmAgentBuilder};
pub use tool_phase::{execute_tools, ToolScope};

use crate::context::RunContext;
use crate::stream::MessageStream;

/// Anything that can run an invocation: model-backed agents, and flow
/// combinators built on top of them.
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Run one turn. The returned sequence is lazy: nothing happens until it
    /// is polled, and dropping it stops all further work.
    fn run(&self, ctx: RunContext, invocation: Invocation) -> MessageStream;
}
