//! Message structures and delivery status tracking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a user (counterpart or local user)
pub type UserId = i64;

/// Sender id reserved for the local user
pub const LOCAL_USER_ID: UserId = -1;

/// Prefix reserved for identifiers of messages created on this client
pub const LOCAL_ID_PREFIX: &str = "local_";

/// Message identifier, unique within its chat
///
/// Server-assigned ids are opaque strings (e.g. `msg_5`). Messages created
/// locally get a [`LOCAL_ID_PREFIX`] id that is kept after the server
/// confirms delivery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap a server-provided identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh temporary identifier for a locally created message
    pub fn new_local() -> Self {
        Self(format!("{}{}", LOCAL_ID_PREFIX, uuid::Uuid::new_v4()))
    }

    /// Whether this identifier was generated locally
    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_ID_PREFIX)
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Message delivery status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    /// Message sent but not yet confirmed by the service
    Sent,
    /// Message delivered to the service
    #[default]
    Delivered,
    /// Message read by the recipient
    Read,
}

impl DeliveryStatus {
    /// Short marker used when rendering message bubbles
    pub fn indicator(&self) -> &'static str {
        match self {
            Self::Sent => "✓",
            Self::Delivered => "✓✓",
            Self::Read => "✓✓ read",
        }
    }
}

/// One line in a chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message ID
    pub id: MessageId,
    /// Text content
    pub content: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Sender id ([`LOCAL_USER_ID`] for the local user)
    pub sender_id: UserId,
    /// Delivery status
    #[serde(default)]
    pub status: DeliveryStatus,
    /// Whether the local user bookmarked this message
    #[serde(default)]
    pub bookmarked: bool,
}

impl Message {
    /// Create a message as received from the service
    pub fn new(
        id: impl Into<MessageId>,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
        sender_id: UserId,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            created_at,
            sender_id,
            status: DeliveryStatus::Delivered,
            bookmarked: false,
        }
    }

    /// Create an outgoing message with a temporary id, stamped now
    pub fn new_local(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new_local(),
            content: content.into(),
            created_at: Utc::now(),
            sender_id: LOCAL_USER_ID,
            status: DeliveryStatus::Sent,
            bookmarked: false,
        }
    }

    /// Whether the local user wrote this message
    pub fn is_from_local_user(&self) -> bool {
        self.sender_id == LOCAL_USER_ID
    }

    /// Whether this is a local message the service has not confirmed yet
    pub fn is_pending_delivery(&self) -> bool {
        self.is_from_local_user() && self.status == DeliveryStatus::Sent
    }

    /// Mark message as delivered
    pub fn mark_delivered(&mut self) {
        self.status = DeliveryStatus::Delivered;
    }

    /// Get full status text for the presentation layer
    pub fn status_text(&self) -> &'static str {
        match self.status {
            DeliveryStatus::Sent if self.id.is_local() => "not yet delivered",
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Read => "read",
        }
    }
}
