//! The generate → tool → generate loop behind every [`LlmAgent`](super::LlmAgent).

use std::sync::Arc;

use futures::StreamExt;
use tracing::debug;

use super::invocation::Invocation;
use super::llm_agent::AgentCore;
use super::tool_phase::{execute_tools, ToolScope};
use crate::context::RunContext;
use crate::error::{AgentryError, Result};
use crate::middleware::Handler;
use crate::provider::{ModelRequest, ModelResponse};
use crate::stream::MessageStream;
use crate::tools::ToolRegistry;
use crate::types::{Message, Role, USER_AUTHOR};

/// Terminal handler wrapped by the agent's middleware chain.
pub(crate) struct AgentLoop {
    pub(crate) core: Arc<AgentCore>,
}

impl Handler for AgentLoop {
    fn handle(&self, ctx: RunContext, invocation: Invocation) -> MessageStream {
        let core = self.core.clone();
        Box::pin(async_stream::stream! {
            let tools = match core.tools.resolve(core.resolver.as_deref(), &ctx).await {
                Ok(tools) => tools,
                Err(error) => {
                    yield Err(error);
                    return;
                }
            };
            let messages = match prepare_messages(&invocation).await {
                Ok(messages) => messages,
                Err(error) => {
                    yield Err(error);
                    return;
                }
            };
            let mut request = ModelRequest {
                instruction: core.instruction.clone(),
                messages,
                tools: tools.definitions(),
                input_schema: core.input_schema.clone(),
                output_schema: core.output_schema.clone(),
            };
            let scope = ToolScope {
                invocation_id: invocation.id.clone(),
                agent: core.name.clone(),
                session_id: invocation.session_id().map(str::to_string),
            };

            for iteration in 1..=core.max_iterations {
                if ctx.is_canceled() {
                    yield Err(AgentryError::Canceled);
                    return;
                }
                debug!(
                    invocation_id = %invocation.id,
                    agent = %core.name,
                    iteration,
                    streamable = invocation.streamable,
                    "generating"
                );

                let mut final_response = None;
                if invocation.streamable {
                    let opened = tokio::select! {
                        biased;
                        _ = ctx.canceled() => Err(AgentryError::Canceled),
                        opened = core.provider.new_stream(&ctx, &request) => opened,
                    };
                    let mut chunks = match opened {
                        Ok(chunks) => chunks,
                        Err(error) => {
                            yield Err(error);
                            return;
                        }
                    };
                    loop {
                        let next = tokio::select! {
                            biased;
                            _ = ctx.canceled() => Some(Err(AgentryError::Canceled)),
                            next = chunks.next() => next,
                        };
                        let Some(chunk) = next else { break };
                        match chunk {
                            Ok(response) => {
                                let message = stamp(response, &invocation.id, &core.name);
                                if message.is_completed() {
                                    final_response = Some(message);
                                    break;
                                }
                                yield Ok(message);
                            }
                            Err(error) => {
                                yield Err(error);
                                return;
                            }
                        }
                    }
                } else {
                    let generated = tokio::select! {
                        biased;
                        _ = ctx.canceled() => Err(AgentryError::Canceled),
                        generated = core.provider.generate(&ctx, &request) => generated,
                    };
                    match generated {
                        Ok(response) => final_response = Some(stamp(response, &invocation.id, &core.name)),
                        Err(error) => {
                            yield Err(error);
                            return;
                        }
                    }
                }

                let Some(response) = final_response else {
                    yield Err(AgentryError::MissingFinalResponse);
                    return;
                };

                if response.role == Role::Tool {
                    let tool_message = match run_tool_round(&ctx, &tools, response, &scope, &invocation).await {
                        Ok(message) => message,
                        Err(error) => {
                            yield Err(error);
                            return;
                        }
                    };
                    request.messages.push(tool_message);
                    continue;
                }

                if response.is_completed() {
                    if let Some(session) = &invocation.session {
                        if let Err(error) = session.append(vec![response.clone()]).await {
                            yield Err(error);
                            return;
                        }
                    }
                }
                debug!(
                    invocation_id = %invocation.id,
                    agent = %core.name,
                    iteration,
                    "invocation completed"
                );
                yield Ok(response);
                return;
            }

            yield Err(AgentryError::MaxIterationsExceeded(core.max_iterations));
        })
    }
}

/// Session snapshot, caller history, then the new input. The input message is
/// recorded in the session once, before any model call; a re-run of the same
/// invocation finds it in the snapshot instead.
async fn prepare_messages(invocation: &Invocation) -> Result<Vec<Message>> {
    let mut messages = Vec::new();
    if let Some(session) = &invocation.session {
        messages.extend(session.history().await?);
    }
    let Some(input) = &invocation.message else {
        messages.extend(invocation.history.iter().cloned());
        return Ok(messages);
    };
    let recorded = messages
        .iter()
        .any(|m| m.id == input.id && m.invocation_id == invocation.id);
    if recorded {
        messages.extend(invocation.history.iter().cloned());
        return Ok(messages);
    }

    let mut input = input.clone().with_invocation_id(invocation.id.clone());
    if input.author.is_empty() {
        input.author = USER_AUTHOR.to_string();
    }
    if let Some(session) = &invocation.session {
        session.append(vec![input.clone()]).await?;
    }
    messages.extend(invocation.history.iter().cloned());
    messages.push(input);
    Ok(messages)
}

/// Execute the requested tools and persist the filled-in tool message. The
/// tool message is intermediate state and is never yielded.
async fn run_tool_round(
    ctx: &RunContext,
    tools: &ToolRegistry,
    response: Message,
    scope: &ToolScope,
    invocation: &Invocation,
) -> Result<Message> {
    let tool_message = execute_tools(ctx, tools, response, scope).await?;
    if let Some(session) = &invocation.session {
        session.append(vec![tool_message.clone()]).await?;
    }
    Ok(tool_message)
}

fn stamp(response: ModelResponse, invocation_id: &str, author: &str) -> Message {
    let mut message = response.message;
    message.invocation_id = invocation_id.to_string();
    message.author = author.to_string();
    message
}
