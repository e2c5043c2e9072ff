//! Concurrent execution of the tool calls carried by one message.

use std::collections::HashMap;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::context::RunContext;
use crate::error::{AgentryError, Result};
use crate::tools::{ToolContext, ToolRegistry};
use crate::types::{Message, Part};

/// Identity shared by every call in one tool round.
#[derive(Debug, Clone, Default)]
pub struct ToolScope {
    pub invocation_id: String,
    pub agent: String,
    pub session_id: Option<String>,
}

/// Run every tool-invocation part of `message` in parallel and write each
/// result into the part it came from.
///
/// The calls form a fail-fast group: the first failure cancels the group's
/// token, aborts the remaining tasks and is returned as the error of the
/// whole round. No partial results escape.
pub async fn execute_tools(
    ctx: &RunContext,
    tools: &ToolRegistry,
    message: Message,
    scope: &ToolScope,
) -> Result<Message> {
    let calls: Vec<_> = message
        .tool_parts()
        .into_iter()
        .map(|(idx, part)| (idx, part.clone()))
        .collect();
    if calls.is_empty() {
        return Ok(message);
    }

    let group = ctx.child();
    let mut tasks = JoinSet::new();
    let mut task_names = HashMap::new();

    for (idx, call) in calls {
        let tool = tools.get(&call.name);
        let tool_ctx = ToolContext {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            invocation_id: scope.invocation_id.clone(),
            agent: scope.agent.clone(),
            session_id: scope.session_id.clone(),
            run: group.clone(),
        };
        let name = call.name.clone();
        let handle = tasks.spawn(async move {
            let Some(tool) = tool else {
                return (idx, Err(AgentryError::ToolNotFound(call.name)));
            };
            debug!(tool = %call.name, call_id = %call.id, "tool call started");
            let output = tool
                .handle(&tool_ctx, &call.request)
                .await
                .map_err(|e| attribute_error(&call.name, e));
            (idx, output)
        });
        task_names.insert(handle.id(), name);
    }

    let mut message = message;
    loop {
        let joined = tokio::select! {
            biased;
            _ = ctx.canceled() => {
                group.cancel();
                tasks.abort_all();
                return Err(AgentryError::Canceled);
            }
            joined = tasks.join_next() => joined,
        };
        let Some(joined) = joined else { break };

        let failure = match joined {
            Ok((idx, Ok(output))) => {
                if let Some(Part::Tool(part)) = message.parts.get_mut(idx) {
                    debug!(tool = %part.name, call_id = %part.id, "tool call finished");
                    part.response = Some(output);
                }
                continue;
            }
            Ok((_, Err(error))) => error,
            Err(join_error) => {
                let name = task_names
                    .get(&join_error.id())
                    .cloned()
                    .unwrap_or_default();
                AgentryError::tool(name, format!("tool task failed: {join_error}"))
            }
        };

        warn!(error = %failure, "tool round failed; canceling remaining calls");
        group.cancel();
        tasks.abort_all();
        return Err(failure);
    }

    Ok(message)
}

fn attribute_error(tool_name: &str, error: AgentryError) -> AgentryError {
    match error {
        AgentryError::ToolExecution { .. } | AgentryError::ToolNotFound(_) | AgentryError::Canceled => {
            error
        }
        other => AgentryError::tool(tool_name, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{AgentTool, Tool, ToolSchema};
    use crate::types::ToolPart;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn tool<F, Fut>(name: &str, f: F) -> Arc<dyn Tool>
    where
        F: Fn(crate::tools::ToolArguments, ToolContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<serde_json::Value>> + Send + 'static,
    {
        Arc::new(AgentTool::new(name, "test", ToolSchema::empty(), f))
    }

    #[tokio::test]
    async fn results_land_at_original_indices() {
        let registry = ToolRegistry::new(vec![
            tool("slow", |_, _| async {
                tokio::time::sleep(Duration::from_millis(30)).await;
                Ok(serde_json::json!("slow-done"))
            }),
            tool("fast", |_, ctx| async move { Ok(serde_json::json!(ctx.call_id)) }),
        ])
        .expect("registry");
        let message = Message::new(
            crate::types::Role::Tool,
            vec![
                Part::text("thinking"),
                Part::Tool(ToolPart::new("c1", "slow", "{}")),
                Part::Tool(ToolPart::new("c2", "fast", "{}")),
            ],
        );

        let out = execute_tools(&RunContext::new(), &registry, message, &ToolScope::default())
            .await
            .expect("round should succeed");

        assert_eq!(out.parts.len(), 3);
        assert_eq!(out.parts[0], Part::text("thinking"));
        let responses: Vec<_> = out
            .tool_parts()
            .iter()
            .map(|(_, p)| p.response.clone())
            .collect();
        assert_eq!(
            responses,
            vec![Some("slow-done".to_string()), Some("c2".to_string())]
        );
    }

    #[tokio::test]
    async fn unknown_tool_fails_the_round() {
        let message = Message::tool_call([ToolPart::new("c1", "missing", "{}")]);
        let err = execute_tools(
            &RunContext::new(),
            &ToolRegistry::default(),
            message,
            &ToolScope::default(),
        )
        .await
        .expect_err("should fail");
        assert!(matches!(err, AgentryError::ToolNotFound(name) if name == "missing"));
    }

    #[tokio::test]
    async fn first_failure_cancels_siblings() {
        let seen: Arc<Mutex<Option<RunContext>>> = Arc::new(Mutex::new(None));
        let slot = seen.clone();
        let registry = ToolRegistry::new(vec![
            tool("waits", move |_, ctx| {
                let slot = slot.clone();
                async move {
                    *slot.lock().expect("lock") = Some(ctx.run.clone());
                    ctx.run.canceled().await;
                    Ok(serde_json::json!("unreachable"))
                }
            }),
            tool("fails", |_, _| async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Err(AgentryError::tool("fails", "boom"))
            }),
        ])
        .expect("registry");
        let message = Message::tool_call([
            ToolPart::new("c1", "waits", "{}"),
            ToolPart::new("c2", "fails", "{}"),
        ]);
        let parent = RunContext::new();

        let err = execute_tools(&parent, &registry, message, &ToolScope::default())
            .await
            .expect_err("should fail");

        assert!(err.to_string().contains("boom"));
        let sibling = seen.lock().expect("lock").clone().expect("sibling started");
        assert!(sibling.is_canceled());
        assert!(!parent.is_canceled());
    }

    #[tokio::test]
    async fn non_tool_errors_are_attributed_to_the_tool() {
        let registry = ToolRegistry::new(vec![tool("parse", |args, _| async move {
            args.get_str("missing")?;
            Ok(serde_json::json!("never"))
        })])
        .expect("registry");
        let message = Message::tool_call([ToolPart::new("c1", "parse", "{}")]);

        let err = execute_tools(&RunContext::new(), &registry, message, &ToolScope::default())
            .await
            .expect_err("should fail");
        assert!(matches!(err, AgentryError::ToolExecution { ref tool_name, .. } if tool_name == "parse"));
    }
}
