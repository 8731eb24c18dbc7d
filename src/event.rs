//! Store notifications for the presentation layer
//!
//! Every applied command broadcasts a [`StoreEvent`]; subscribers re-read
//! the store's views when they receive one.

use crate::service::ChatFilter;
use crate::store::{ChatId, MessageId};

/// Something changed in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The chat working set was replaced or extended
    ChatsLoaded {
        /// Filter context of the working set
        filter: ChatFilter,
        /// Number of chats in the working set
        count: usize,
    },
    /// A listing response arrived after a newer one and was dropped
    ListingSuperseded,
    /// A chat was opened
    ChatSelected(ChatId),
    /// A chat's fields changed (read state, pin, bookmark)
    ChatUpdated(ChatId),
    /// A chat's message thread was replaced by a loaded page
    MessagesLoaded(ChatId),
    /// A local message was appended optimistically
    MessageSent {
        /// Owning chat
        chat_id: ChatId,
        /// Temporary id of the message
        message_id: MessageId,
    },
    /// The service confirmed a local message
    MessageDelivered {
        /// Owning chat
        chat_id: ChatId,
        /// Temporary id of the message
        message_id: MessageId,
    },
    /// The service never confirmed a local message; it stays `SENT`
    DeliveryFailed {
        /// Owning chat
        chat_id: ChatId,
        /// Temporary id of the message
        message_id: MessageId,
        /// Service error text
        reason: String,
    },
    /// New messages arrived through polling
    MessagesPolled {
        /// Owning chat
        chat_id: ChatId,
        /// Number of messages appended
        count: usize,
    },
    /// A poll failed; nothing changed
    PollFailed {
        /// Polled chat
        chat_id: ChatId,
        /// Service error text
        reason: String,
    },
    /// The bookmarked-message collection changed
    BookmarksChanged,
    /// Background sync refreshed chat status fields
    ChatsSynced {
        /// Number of local chats refreshed
        refreshed: usize,
    },
}
