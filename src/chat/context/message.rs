use std::fmt::Display;

use rig::{
    OneOrMany,
    message::{AssistantContent, Message, UserContent},
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageRole {
    #[serde(rename = "system")]
    System,

    #[serde(rename = "user")]
    #[serde(alias = "human")]
    User,

    #[serde(rename = "assistant")]
    #[serde(alias = "ai")]
    Assistant,
}

impl TryFrom<&str> for MessageRole {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        serde_plain::from_str(value).map_err(|e| anyhow::anyhow!("{}", e))
    }
}

impl Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        serde_plain::to_string(self)
            .map_err(|_| std::fmt::Error)?
            .fmt(f)
    }
}

/// One turn of a conversation. Chat history is an ordered slice of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

impl From<(MessageRole, String)> for ChatMessage {
    fn from((role, content): (MessageRole, String)) -> Self {
        Self { role, content }
    }
}

impl From<(MessageRole, &str)> for ChatMessage {
    fn from((role, content): (MessageRole, &str)) -> Self {
        Self::new(role, content)
    }
}

impl From<ChatMessage> for Message {
    // rig has no system role inside the history, system turns are sent as user text
    fn from(message: ChatMessage) -> Self {
        match message.role {
            MessageRole::Assistant => Message::Assistant {
                content: OneOrMany::one(AssistantContent::text(message.content)),
            },
            MessageRole::User | MessageRole::System => Message::User {
                content: OneOrMany::one(UserContent::text(message.content)),
            },
        }
    }
}
