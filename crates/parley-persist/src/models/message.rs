use serde::{Deserialize, Serialize};

/// One persisted conversation turn. Field names match the stored JSON
/// (`{"Role": ..., "Content": ...}`); role values stay lowercase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "Role")]
    pub role: MessageRole,
    #[serde(rename = "Content")]
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

impl From<MessageRole> for parley_llm::Role {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::System => parley_llm::Role::System,
            MessageRole::User => parley_llm::Role::User,
            MessageRole::Assistant => parley_llm::Role::Assistant,
        }
    }
}

impl From<parley_llm::Role> for MessageRole {
    fn from(role: parley_llm::Role) -> Self {
        match role {
            parley_llm::Role::System => MessageRole::System,
            parley_llm::Role::User => MessageRole::User,
            parley_llm::Role::Assistant => MessageRole::Assistant,
        }
    }
}

impl From<ChatMessage> for parley_llm::ChatMessage {
    fn from(msg: ChatMessage) -> Self {
        Self {
            role: msg.role.into(),
            content: msg.content,
        }
    }
}

impl From<parley_llm::ChatMessage> for ChatMessage {
    fn from(msg: parley_llm::ChatMessage) -> Self {
        Self {
            role: msg.role.into(),
            content: msg.content,
        }
    }
}
