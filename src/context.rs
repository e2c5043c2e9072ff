//! Request-scoped context threaded through agents, middleware, providers and tools.

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;

/// Explicit per-request context.
///
/// Cloning shares the cancellation token; [`RunContext::child`] derives a token
/// that is canceled with its parent but can also be canceled on its own.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    cancel: CancellationToken,
    agent: Option<String>,
    metadata: HashMap<String, String>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context driven by an existing cancellation token.
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            ..Self::default()
        }
    }

    /// Name of the agent currently running, if any.
    pub fn agent(&self) -> Option<&str> {
        self.agent.as_deref()
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Resolves once this context is canceled.
    pub async fn canceled(&self) {
        self.cancel.cancelled().await
    }

    /// Derive a context whose cancellation is scoped below this one.
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            agent: self.agent.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_is_canceled_with_parent_but_not_the_reverse() {
        let parent = RunContext::new().with_agent("planner");
        let child = parent.child();
        child.cancel();
        assert!(!parent.is_canceled());

        let other = parent.child();
        parent.cancel();
        assert!(other.is_canceled());
        assert_eq!(other.agent(), Some("planner"));
    }
}
