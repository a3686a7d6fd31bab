use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a turn in the chat history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Role this sender takes on the completion wire
    pub fn role(&self) -> Role {
        match self {
            Sender::User => Role::User,
            Sender::Assistant => Role::Assistant,
        }
    }
}

/// One turn of the conversation as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            sender: Sender::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            sender: Sender::Assistant,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Role in a completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A role/content pair sent to the completion API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl WireMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

impl From<&ChatMessage> for WireMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.sender.role(),
            content: msg.text.clone(),
        }
    }
}
