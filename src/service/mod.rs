//! Remote conversation service
//!
//! The store talks to the conversation backend only through the
//! [`ChatService`] trait. The backend is treated as at-least-once, possibly
//! slow and possibly failing; every method can return [`crate::Error::Service`].
//!
//! - `types` - request/response shapes (filters, pages, cursors)
//! - `mock` - in-memory simulated backend used by the TUI and the tests

pub mod mock;
pub mod types;

use crate::store::{ChatId, Message, MessageId};
use crate::Result;
use async_trait::async_trait;

pub use mock::MockChatService;
pub use types::{ChatFilter, ChatPage, MessageCursor, MessagePage, NextCursor, PageRequest};

/// Port to the remote conversation service
#[async_trait]
pub trait ChatService: Send + Sync {
    /// List chats matching `filter`, one offset page at a time
    async fn list_chats(&self, filter: ChatFilter, page: PageRequest) -> Result<ChatPage>;

    /// List a chat's messages starting after the cursor
    async fn list_messages(&self, chat_id: ChatId, cursor: MessageCursor) -> Result<MessagePage>;

    /// Set a chat's read flag
    async fn set_read_state(&self, chat_id: ChatId, read: bool) -> Result<()>;

    /// Messages strictly after `last_message_id` (empty if none)
    async fn poll_messages(&self, chat_id: ChatId, last_message_id: &MessageId) -> Result<Vec<Message>>;

    /// Deliver a locally composed message
    async fn deliver_message(&self, chat_id: ChatId, message: &Message) -> Result<()>;
}
