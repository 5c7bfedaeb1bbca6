//! Message model
//!
//! Private messages, system notifications and notices exchanged between
//! accounts. Inbox/outbox are two views over the same table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum message length in characters.
pub const MESSAGE_MAX_LEN: usize = 512;

/// Message joined with sender/receiver display info.
#[derive(Debug, Clone)]
pub struct MessageWithUsers {
    pub id: i64,
    pub sender_id: i64,
    pub sender_name: Option<String>,
    pub sender_avatar: Option<String>,
    pub receiver_id: i64,
    pub receiver_name: Option<String>,
    pub receiver_avatar: Option<String>,
    pub message_type: MessageType,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Message type. Non-staff accounts may only send `private`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    System,
    Private,
    Notice,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::System => "system",
            MessageType::Private => "private",
            MessageType::Notice => "notice",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "system" => Some(MessageType::System),
            "private" => Some(MessageType::Private),
            "notice" => Some(MessageType::Notice),
            _ => None,
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for MessageType {
    fn default() -> Self {
        Self::Notice
    }
}

/// Input for sending a message
#[derive(Debug, Clone)]
pub struct SendMessageInput {
    pub receiver_id: i64,
    pub message_type: MessageType,
    pub content: String,
}

/// Filters for inbox queries (outbox ignores `is_read`)
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub message_type: Option<MessageType>,
    pub is_read: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_roundtrip() {
        for t in [MessageType::System, MessageType::Private, MessageType::Notice] {
            assert_eq!(MessageType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(MessageType::from_str("broadcast"), None);
    }

    #[test]
    fn test_default_type_is_notice() {
        assert_eq!(MessageType::default(), MessageType::Notice);
    }
}
