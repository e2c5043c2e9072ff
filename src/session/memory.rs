use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Session;
use crate::error::Result;
use crate::types::Message;

#[derive(Default)]
struct Inner {
    history: Vec<Message>,
    state: HashMap<String, serde_json::Value>,
}

/// In-memory session for tests, local development and short-lived processes.
pub struct InMemorySession {
    id: String,
    inner: RwLock<Inner>,
}

impl InMemorySession {
    /// Create an empty session with a generated id.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Create a session pre-seeded with history.
    pub fn with_history(id: impl Into<String>, history: Vec<Message>) -> Self {
        Self {
            id: id.into(),
            inner: RwLock::new(Inner {
                history,
                state: HashMap::new(),
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.history.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySession")
            .field("id", &self.id)
            .finish()
    }
}

#[async_trait]
impl Session for InMemorySession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn history(&self) -> Result<Vec<Message>> {
        Ok(self.inner.read().await.history.clone())
    }

    async fn append(&self, messages: Vec<Message>) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.history.extend(messages);
        Ok(())
    }

    async fn state(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.inner.read().await.state.get(key).cloned())
    }

    async fn set_state(&self, key: &str, value: serde_json::Value) -> Result<()> {
        self.inner.write().await.state.insert(key.to_string(), value);
        Ok(())
    }
}
