use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::core::attachment::Attachment;

/// Role of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    User,
    Model,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
            Role::System => "system",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    pub fn is_model(self) -> bool {
        self == Role::Model
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "model" => Ok(Role::Model),
            "system" => Ok(Role::System),
            _ => Err(format!("invalid message role: {value}")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

/// A web source reference returned alongside a grounded model response.
///
/// Read-only once constructed; the renderer links to it, nothing rewrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub uri: String,
    pub title: String,
}

/// One transcript entry.
///
/// Messages are owned by the [`ConversationStore`](crate::core::conversation::ConversationStore)
/// and are never mutated after insertion; the only structural change a message
/// can undergo is the atomic thinking-placeholder replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Marks a transient placeholder shown while a response is pending.
    #[serde(default)]
    pub is_thinking: bool,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl Message {
    pub fn new(id: impl Into<String>, role: Role, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            text: text.into(),
            attachments: Vec::new(),
            timestamp: Utc::now().timestamp_millis(),
            is_thinking: false,
            citations: Vec::new(),
        }
    }

    pub fn user(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, Role::User, text)
    }

    pub fn user_with_attachments(
        id: impl Into<String>,
        text: impl Into<String>,
        attachments: Vec<Attachment>,
    ) -> Self {
        let mut message = Self::new(id, Role::User, text);
        message.attachments = attachments;
        message
    }

    pub fn model(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, Role::Model, text)
    }

    pub fn model_with_citations(
        id: impl Into<String>,
        text: impl Into<String>,
        citations: Vec<Citation>,
    ) -> Self {
        let mut message = Self::new(id, Role::Model, text);
        message.citations = citations;
        message
    }

    /// A transient model-role entry shown while a gateway call is in flight.
    pub fn thinking(id: impl Into<String>) -> Self {
        let mut message = Self::new(id, Role::Model, "");
        message.is_thinking = true;
        message
    }

    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}
