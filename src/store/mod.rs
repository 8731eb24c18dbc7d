//! Conversation store
//!
//! This module owns the client's view of chats and messages:
//! - `message` - Message structures and delivery status
//! - `chat` - Chat conversations and their read/unread bookkeeping
//! - `bookmark` - Bookmarked-message projection
//! - `ordering` - Chat ordering policy
//! - `state` - Synchronous state and reconciliation rules
//! - `chat_store` - Async command interface over the state
//! - `settings` - Client settings and configuration

// Submodules
pub mod bookmark;
pub mod chat;
pub mod chat_store;
pub mod message;
pub mod ordering;
pub mod settings;
pub mod state;

// Re-export commonly used types
pub use bookmark::BookmarkedMessage;
pub use chat::{Chat, ChatId, Counterpart, LastMessage, UserProfile};
pub use chat_store::ChatStore;
pub use message::{DeliveryStatus, Message, MessageId, UserId, LOCAL_USER_ID};
pub use ordering::ChatOrdering;
pub use settings::Settings;
pub use state::{ListingTicket, MessageGroup, Reconciled, StoreSnapshot, StoreState};
