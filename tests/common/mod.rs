//! Shared test helpers: a scripted provider, recording tools and a failing session.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use agentry::context::RunContext;
use agentry::error::{AgentryError, Result};
use agentry::provider::{ModelProvider, ModelRequest, ModelResponse, ModelResponseStream};
use agentry::session::{InMemorySession, Session};
use agentry::tools::{AgentTool, Tool, ToolSchema};
use agentry::types::{Message, MessageStatus, ToolPart};

/// One scripted provider turn.
pub enum Step {
    /// A single completed response.
    Reply(Message),
    /// Streamed chunks, in order.
    Chunks(Vec<Message>),
    /// A provider error.
    Fail(String),
    /// A retryable rate-limit error.
    RateLimited,
}

/// A provider that plays back canned steps and records every request.
pub struct ScriptedProvider {
    steps: Mutex<VecDeque<Step>>,
    fallback: Option<Message>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedProvider {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into_iter().collect()),
            fallback: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answer every call with `message`.
    pub fn repeating(message: Message) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(VecDeque::new()),
            fallback: Some(message),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_step(&self, request: &ModelRequest) -> Result<Step> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(step) = self.steps.lock().unwrap().pop_front() {
            return Ok(step);
        }
        match &self.fallback {
            Some(message) => Ok(Step::Reply(message.clone().with_id(uuid::Uuid::new_v4().to_string()))),
            None => Err(AgentryError::provider("scripted", "script exhausted")),
        }
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _ctx: &RunContext, request: &ModelRequest) -> Result<ModelResponse> {
        match self.next_step(request)? {
            Step::Reply(message) => Ok(message.into()),
            Step::Chunks(chunks) => chunks
                .into_iter()
                .last()
                .map(ModelResponse::from)
                .ok_or_else(|| AgentryError::provider("scripted", "empty chunk list")),
            Step::Fail(message) => Err(AgentryError::provider("scripted", message)),
            Step::RateLimited => Err(AgentryError::RateLimited { retry_after_ms: None }),
        }
    }

    async fn new_stream(&self, _ctx: &RunContext, request: &ModelRequest) -> Result<ModelResponseStream> {
        let chunks = match self.next_step(request)? {
            Step::Reply(message) => vec![message],
            Step::Chunks(chunks) => chunks,
            Step::Fail(message) => return Err(AgentryError::provider("scripted", message)),
            Step::RateLimited => return Err(AgentryError::RateLimited { retry_after_ms: None }),
        };
        Ok(Box::pin(futures::stream::iter(
            chunks.into_iter().map(|m| Ok(ModelResponse::from(m))),
        )))
    }
}

/// An incomplete streaming chunk.
pub fn partial(text: &str) -> Message {
    Message::assistant(text).with_status(MessageStatus::Incomplete)
}

/// A model response requesting the given `(call_id, tool_name)` calls.
pub fn tool_request(calls: &[(&str, &str)]) -> Message {
    Message::tool_call(
        calls
            .iter()
            .map(|(id, name)| ToolPart::new(*id, *name, "{}")),
    )
}

/// A tool that returns `output` and counts its calls.
pub fn constant_tool(name: &str, output: &str, calls: Arc<AtomicUsize>) -> Arc<dyn Tool> {
    let output = output.to_string();
    Arc::new(AgentTool::new(name, "returns a constant", ToolSchema::empty(), move |_, _| {
        let output = output.clone();
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::Value::String(output))
        }
    }))
}

/// A tool that fails with `message` after a short delay.
pub fn failing_tool(name: &str, message: &str) -> Arc<dyn Tool> {
    let tool_name = name.to_string();
    let message = message.to_string();
    Arc::new(AgentTool::new(name, "always fails", ToolSchema::empty(), move |_, _| {
        let tool_name = tool_name.clone();
        let message = message.clone();
        async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            Err(AgentryError::tool(tool_name, message))
        }
    }))
}

/// Session whose appends fail once `fail_after` appends succeeded.
pub struct FlakySession {
    inner: InMemorySession,
    fail_after: usize,
    appends: AtomicUsize,
}

impl FlakySession {
    pub fn new(fail_after: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemorySession::with_id("flaky"),
            fail_after,
            appends: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Session for FlakySession {
    fn id(&self) -> &str {
        self.inner.id()
    }

    async fn history(&self) -> Result<Vec<Message>> {
        self.inner.history().await
    }

    async fn append(&self, messages: Vec<Message>) -> Result<()> {
        if self.appends.fetch_add(1, Ordering::SeqCst) >= self.fail_after {
            return Err(AgentryError::Session("disk full".into()));
        }
        self.inner.append(messages).await
    }

    async fn state(&self, key: &str) -> Result<Option<serde_json::Value>> {
        self.inner.state(key).await
    }

    async fn set_state(&self, key: &str, value: serde_json::Value) -> Result<()> {
        self.inner.set_state(key, value).await
    }
}
