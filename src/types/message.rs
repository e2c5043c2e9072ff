//! Message types exchanged with models, tools and sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Author recorded on messages supplied by the end user.
pub const USER_AUTHOR: &str = "user";

/// A node in the conversation transcript.
///
/// `parts` is index-addressable: tool execution writes each result back into
/// the same index it read the call from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub parts: Vec<Part>,
    pub status: MessageStatus,
    /// Logical producer (agent name, or [`USER_AUTHOR`]).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author: String,
    /// Invocation this message belongs to; stamped by the engine.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub invocation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a completed message with a fresh id.
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            parts,
            status: MessageStatus::Completed,
            author: String::new(),
            invocation_id: String::new(),
            timestamp: Some(Utc::now()),
        }
    }

    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, vec![Part::text(text)])
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Part::text(text)]).with_author(USER_AUTHOR)
    }

    /// Create an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, vec![Part::text(text)])
    }

    /// Create a tool message requesting the given calls.
    pub fn tool_call(calls: impl IntoIterator<Item = ToolPart>) -> Self {
        Self::new(Role::Tool, calls.into_iter().map(Part::Tool).collect())
    }

    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_invocation_id(mut self, invocation_id: impl Into<String>) -> Self {
        self.invocation_id = invocation_id.into();
        self
    }

    /// Append a part.
    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == MessageStatus::Completed
    }

    /// Extract the text content, concatenating all text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Tool-invocation parts together with their index in `parts`.
    pub fn tool_parts(&self) -> Vec<(usize, &ToolPart)> {
        self.parts
            .iter()
            .enumerate()
            .filter_map(|(idx, part)| match part {
                Part::Tool(tool) => Some((idx, tool)),
                _ => None,
            })
            .collect()
    }
}

/// Conversation role.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// Lifecycle status of a message.
///
/// `Incomplete` marks a partial streamed chunk; `Completed` marks the terminal
/// message for its role in the current step.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageStatus {
    InProgress,
    Incomplete,
    Completed,
}

/// A single typed unit of message content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    Text { text: String },
    File(FilePart),
    Data(DataPart),
    Tool(ToolPart),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Reference to an external file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilePart {
    pub uri: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Inline binary payload, base64-encoded on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataPart {
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A tool invocation: call identity, serialized arguments and, once executed,
/// the serialized result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolPart {
    pub id: String,
    pub name: String,
    pub request: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl ToolPart {
    pub fn new(id: impl Into<String>, name: impl Into<String>, request: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            request: request.into(),
            response: None,
        }
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tool_parts_report_original_indices() {
        let message = Message::new(
            Role::Tool,
            vec![
                Part::text("calling"),
                Part::Tool(ToolPart::new("c1", "a", "{}")),
                Part::Tool(ToolPart::new("c2", "b", "{}")),
            ],
        );
        let indices: Vec<usize> = message.tool_parts().iter().map(|(idx, _)| *idx).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn data_part_serializes_as_base64() {
        let part = Part::Data(DataPart {
            bytes: b"hi".to_vec(),
            mime_type: "text/plain".into(),
            name: None,
        });
        let json = serde_json::to_value(&part).expect("serialize");
        assert_eq!(json["type"], "data");
        assert_eq!(json["bytes"], "aGk=");
        let back: Part = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, part);
    }

    #[test]
    fn status_and_role_use_snake_case_names() {
        assert_eq!(MessageStatus::InProgress.to_string(), "in_progress");
        assert_eq!("tool".parse::<Role>().expect("parse role"), Role::Tool);
        let json = serde_json::to_string(&MessageStatus::Incomplete).expect("serialize");
        assert_eq!(json, "\"incomplete\"");
    }

    #[test]
    fn user_message_is_authored_by_user() {
        let message = Message::user("hello");
        assert_eq!(message.author, USER_AUTHOR);
        assert_eq!(message.role, Role::User);
        assert!(message.is_completed());
        assert_eq!(message.text(), "hello");
    }
}
