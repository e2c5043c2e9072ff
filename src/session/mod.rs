//! Sessions: append-only transcripts shared across invocations.

mod memory;

pub use memory::InMemorySession;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Message;

/// Durable, append-only conversation transcript plus key/value scratch state.
///
/// History only grows: implementations must never remove or rewrite an
/// appended message, and concurrent appends must be serialized so ordering is
/// deterministic when several invocations share one session.
#[async_trait]
pub trait Session: Send + Sync {
    /// Session identity.
    fn id(&self) -> &str;

    /// Ordered snapshot of the transcript.
    async fn history(&self) -> Result<Vec<Message>>;

    /// Atomically append messages, in order.
    async fn append(&self, messages: Vec<Message>) -> Result<()>;

    /// Read a scratch value.
    async fn state(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Write a scratch value.
    async fn set_state(&self, key: &str, value: serde_json::Value) -> Result<()>;
}
