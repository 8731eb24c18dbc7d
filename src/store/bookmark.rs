//! Bookmarked-message projection

use crate::store::chat::{Chat, ChatId};
use crate::store::message::{Message, MessageId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label used for messages written by the local user
pub const LOCAL_SENDER_LABEL: &str = "You";

/// Denormalized copy of a bookmarked message
///
/// This is a derived cache: it is created when a message's `bookmarked`
/// flag turns on and removed when it turns off. Its fields always equal the
/// source message's fields at the time of the toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkedMessage {
    /// Message ID
    pub id: MessageId,
    /// Chat the message belongs to
    pub chat_id: ChatId,
    /// Text content
    pub content: String,
    /// Resolved sender display name
    pub sender_name: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl BookmarkedMessage {
    /// Project a message, resolving the sender name from its chat
    pub fn project(chat_id: ChatId, message: &Message, chat: Option<&Chat>) -> Self {
        Self {
            id: message.id.clone(),
            chat_id,
            content: message.content.clone(),
            sender_name: sender_name(message, chat),
            created_at: message.created_at,
        }
    }

    /// Whether this projection refers to `message_id` in `chat_id`
    pub fn refers_to(&self, chat_id: ChatId, message_id: &MessageId) -> bool {
        self.chat_id == chat_id && &self.id == message_id
    }
}

/// Resolve a sender display name
///
/// Local messages are labelled [`LOCAL_SENDER_LABEL`]; other senders take the
/// owning chat's counterpart name, or `"User <id>"` when the chat is unknown.
pub fn sender_name(message: &Message, chat: Option<&Chat>) -> String {
    if message.is_from_local_user() {
        return LOCAL_SENDER_LABEL.to_string();
    }
    match chat.map(Chat::display_name) {
        Some(name) if !name.is_empty() => name,
        _ => format!("User {}", message.sender_id),
    }
}
