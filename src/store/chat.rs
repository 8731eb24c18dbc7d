//! Chat conversation management

use crate::store::message::{DeliveryStatus, Message, MessageId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable chat identifier
pub type ChatId = i64;

/// Public profile data of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Avatar URL (may be empty)
    #[serde(default)]
    pub profile_picture: String,
    /// Short headline shown under the name
    #[serde(default)]
    pub headline: String,
}

impl UserProfile {
    /// Display name: "first last"
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => String::new(),
        }
    }
}

/// Denormalized snapshot of the other participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterpart {
    /// The counterpart's user id
    pub user_id: UserId,
    /// Profile snapshot
    pub profile: UserProfile,
}

/// Denormalized summary of a chat's latest message, used for list rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMessage {
    /// Message ID
    pub id: MessageId,
    /// Text content
    pub content: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Delivery status
    pub status: DeliveryStatus,
}

impl From<&Message> for LastMessage {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            content: message.content.clone(),
            created_at: message.created_at,
            status: message.status,
        }
    }
}

/// One conversation between the local user and a counterpart
///
/// `read == true` implies `unread_count == 0`; every mutator below keeps
/// that invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    /// Stable chat id
    pub chat_id: ChatId,
    /// The other participant
    pub counterpart: Counterpart,
    /// Summary of the latest message
    pub last_message: LastMessage,
    /// Whether the chat has been read
    pub read: bool,
    /// Number of unread messages
    pub unread_count: u32,
    /// Chat-level bookmark, independent of message bookmarks
    #[serde(default)]
    pub bookmark: bool,
    /// Client-local pin annotation, never round-tripped through listings
    #[serde(default)]
    pub pinned: bool,
}

impl Chat {
    /// Create a chat as observed in a listing response
    pub fn new(chat_id: ChatId, counterpart: Counterpart, last_message: LastMessage) -> Self {
        Self {
            chat_id,
            counterpart,
            last_message,
            read: true,
            unread_count: 0,
            bookmark: false,
            pinned: false,
        }
    }

    /// Display name of the counterpart
    pub fn display_name(&self) -> String {
        self.counterpart.profile.full_name()
    }

    /// Set the read flag; both directions reset the unread count
    pub fn set_read_state(&mut self, read: bool) {
        self.read = read;
        self.unread_count = 0;
    }

    /// Record `count` newly arrived messages the user has not seen
    pub fn add_unread(&mut self, count: u32) {
        if count == 0 {
            return;
        }
        self.unread_count = self.unread_count.saturating_add(count);
        self.read = false;
    }

    /// Replace the last-message summary
    pub fn set_last_message(&mut self, message: &Message) {
        self.last_message = LastMessage::from(message);
    }

    /// Force `read ⇒ unread_count == 0` on data arriving from the service
    pub fn normalize_read_state(&mut self) {
        if self.read {
            self.unread_count = 0;
        }
    }

    /// Adopt every server-provided field from `server`, keeping the local pin
    pub fn adopt_server_fields(&mut self, server: &Chat) {
        let pinned = self.pinned;
        *self = server.clone();
        self.pinned = pinned;
        self.normalize_read_state();
    }

    /// Refresh only the server-authoritative status fields
    pub fn merge_status_from(&mut self, server: &Chat) {
        self.read = server.read;
        self.unread_count = server.unread_count;
        self.last_message = server.last_message.clone();
        self.bookmark = server.bookmark;
        self.normalize_read_state();
    }
}
