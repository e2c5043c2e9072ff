//! One logical turn of an agent.

use std::sync::Arc;

use bon::Builder;
use uuid::Uuid;

use crate::session::Session;
use crate::types::Message;

/// Generate a fresh invocation id.
pub fn new_invocation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Input for one agent turn.
///
/// Created once per turn by the [`Runner`](crate::runner::Runner) or a parent
/// flow. Only the messages it produces are persisted; the invocation itself
/// never is.
///
/// ```
/// use agentry::agent::Invocation;
/// use agentry::types::Message;
///
/// let invocation = Invocation::builder()
///     .message(Message::user("What is the capital of France?"))
///     .streamable(true)
///     .build();
/// assert!(!invocation.id.is_empty());
/// ```
#[derive(Clone, Builder)]
pub struct Invocation {
    #[builder(into, default = new_invocation_id())]
    pub id: String,
    /// Shared transcript; `None` runs the turn without persistence.
    pub session: Option<Arc<dyn Session>>,
    #[builder(default)]
    pub resumable: bool,
    #[builder(default)]
    pub streamable: bool,
    /// New user input for this turn.
    pub message: Option<Message>,
    /// Extra context supplied by the caller (e.g., a flow combinator).
    #[builder(default)]
    pub history: Vec<Message>,
}

impl Invocation {
    /// A non-streaming, sessionless invocation for `message`.
    pub fn new(message: Message) -> Self {
        Self::builder().message(message).build()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.id())
    }
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("id", &self.id)
            .field("session", &self.session_id())
            .field("resumable", &self.resumable)
            .field("streamable", &self.streamable)
            .field("message", &self.message)
            .field("history", &self.history.len())
            .finish()
    }
}
