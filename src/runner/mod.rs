//! Top-level entry point: runs an agent against a session.

use std::collections::HashSet;
use std::sync::Arc;

use bon::Builder;
use futures::StreamExt;
use tracing::{debug, info};

use crate::agent::{new_invocation_id, Agent, Invocation};
use crate::config::AgentryConfig;
use crate::context::RunContext;
use crate::error::{AgentryError, Result};
use crate::session::{InMemorySession, Session};
use crate::stream::{self, MessageStream};
use crate::types::Message;

/// Per-call options for [`Runner`].
#[derive(Clone, Default, Builder)]
pub struct RunOptions {
    /// Session to record into; a fresh in-memory session is used when absent.
    pub session: Option<Arc<dyn Session>>,
    /// Reuse an id to resume a previous invocation.
    #[builder(into)]
    pub invocation_id: Option<String>,
}

impl std::fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunOptions")
            .field("session", &self.session.as_ref().map(|s| s.id()))
            .field("invocation_id", &self.invocation_id)
            .finish()
    }
}

/// Runs an agent for one user message.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use agentry::prelude::*;
/// # async fn example(agent: LlmAgent) -> agentry::error::Result<()> {
/// let runner = Runner::new(Arc::new(agent));
/// let reply = runner
///     .run(RunContext::new(), Message::user("What is the capital of France?"), RunOptions::default())
///     .await?;
/// println!("{}", reply.text());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Runner {
    agent: Arc<dyn Agent>,
    config: AgentryConfig,
}

impl Runner {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self {
            agent,
            config: AgentryConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AgentryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AgentryConfig {
        &self.config
    }

    /// Run to completion and return the final message.
    pub async fn run(&self, ctx: RunContext, message: Message, options: RunOptions) -> Result<Message> {
        let invocation = self.invocation(message, options, false);
        info!(
            agent = %self.agent.name(),
            invocation_id = %invocation.id,
            session_id = ?invocation.session_id(),
            "run started"
        );
        stream::collect_last(self.agent.run(ctx, invocation))
            .await?
            .ok_or(AgentryError::NoFinalResponse)
    }

    /// Run as a lazy sequence, yielding partial output as it arrives when the
    /// config's `streamable` flag is set.
    ///
    /// Messages already present in the session before the call are never
    /// re-emitted, so a resumed invocation only surfaces new output.
    pub fn run_stream(&self, ctx: RunContext, message: Message, options: RunOptions) -> MessageStream {
        let invocation = self.invocation(message, options, self.config.streamable);
        let agent = self.agent.clone();
        Box::pin(async_stream::stream! {
            let seen: HashSet<String> = match &invocation.session {
                Some(session) => match session.history().await {
                    Ok(history) => history.into_iter().map(|m| m.id).collect(),
                    Err(error) => {
                        yield Err(error);
                        return;
                    }
                },
                None => HashSet::new(),
            };
            info!(
                agent = %agent.name(),
                invocation_id = %invocation.id,
                session_id = ?invocation.session_id(),
                "streaming run started"
            );

            let mut inner = stream::terminate_on_error(agent.run(ctx, invocation));
            while let Some(item) = inner.next().await {
                if let Ok(message) = &item {
                    if seen.contains(&message.id) {
                        debug!(message_id = %message.id, "skipping message already in session");
                        continue;
                    }
                }
                yield item;
            }
        })
    }

    fn invocation(&self, message: Message, options: RunOptions, streamable: bool) -> Invocation {
        let session = options
            .session
            .unwrap_or_else(|| Arc::new(InMemorySession::new()));
        Invocation::builder()
            .id(options.invocation_id.unwrap_or_else(new_invocation_id))
            .session(session)
            .resumable(self.config.resumable)
            .streamable(streamable)
            .message(message)
            .build()
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("agent", &self.agent.name())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    impl Agent for Silent {
        fn name(&self) -> &str {
            "silent"
        }

        fn run(&self, _ctx: RunContext, _invocation: Invocation) -> MessageStream {
            Box::pin(futures::stream::empty())
        }
    }

    struct Replay(Vec<Message>);

    impl Agent for Replay {
        fn name(&self) -> &str {
            "replay"
        }

        fn run(&self, _ctx: RunContext, _invocation: Invocation) -> MessageStream {
            Box::pin(futures::stream::iter(self.0.clone().into_iter().map(Ok)))
        }
    }

    #[tokio::test]
    async fn empty_run_is_no_final_response() {
        let runner = Runner::new(Arc::new(Silent));
        let err = runner
            .run(RunContext::new(), Message::user("hi"), RunOptions::default())
            .await
            .expect_err("nothing yielded");
        assert!(matches!(err, AgentryError::NoFinalResponse));
    }

    #[tokio::test]
    async fn streaming_skips_messages_already_in_session() {
        let old = Message::assistant("old").with_id("m-old");
        let new = Message::assistant("new").with_id("m-new");
        let session: Arc<dyn Session> =
            Arc::new(InMemorySession::with_history("s", vec![old.clone()]));
        let runner = Runner::new(Arc::new(Replay(vec![old, new])));

        let out = stream::collect_all(runner.run_stream(
            RunContext::new(),
            Message::user("hi"),
            RunOptions::builder().session(session).build(),
        ))
        .await
        .unwrap();

        assert_eq!(out.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(), vec!["m-new"]);
    }

    #[test]
    fn invocation_uses_config_and_options() {
        let runner = Runner::new(Arc::new(Silent)).with_config(AgentryConfig {
            resumable: true,
            ..AgentryConfig::default()
        });
        let invocation = runner.invocation(
            Message::user("hi"),
            RunOptions::builder().invocation_id("inv-1").build(),
            true,
        );
        assert_eq!(invocation.id, "inv-1");
        assert!(invocation.resumable);
        assert!(invocation.streamable);
        assert!(invocation.session.is_some());
    }
}
