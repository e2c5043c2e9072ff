use crate::types::{Message, Role};

/// Most recent completed assistant message recorded for `invocation_id` by
/// `author`, if the invocation already finished once.
pub(crate) fn find_completed(history: &[Message], invocation_id: &str, author: &str) -> Option<Message> {
    history
        .iter()
        .rev()
        .find(|message| {
            message.invocation_id == invocation_id
                && message.author == author
                && message.role == Role::Assistant
                && message.is_completed()
        })
        .cloned()
}
