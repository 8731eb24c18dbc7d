//! Request and response types of the conversation service

use crate::store::{Chat, Message, MessageId};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Chat listing filter; `None` means no constraint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatFilter {
    /// Only chats with this read flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    /// Only chats with this bookmark flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<bool>,
}

impl ChatFilter {
    /// No constraint
    pub fn all() -> Self {
        Self::default()
    }

    /// Unread chats only
    pub fn unread() -> Self {
        Self {
            read: Some(false),
            bookmark: None,
        }
    }

    /// Bookmarked chats only
    pub fn bookmarked() -> Self {
        Self {
            read: None,
            bookmark: Some(true),
        }
    }

    /// Whether `chat` passes this filter
    pub fn matches(&self, chat: &Chat) -> bool {
        self.read.is_none_or(|read| chat.read == read)
            && self.bookmark.is_none_or(|bookmark| chat.bookmark == bookmark)
    }
}

/// Offset-based page of the chat listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Number of chats to return
    pub page_size: u32,
    /// Position of the first chat to return
    pub offset: u32,
}

impl PageRequest {
    /// First page of the listing
    pub fn first(page_size: u32) -> Self {
        Self {
            page_size,
            offset: 0,
        }
    }

    /// Page that follows this one
    pub fn next(&self) -> Self {
        Self {
            page_size: self.page_size,
            offset: self.offset.saturating_add(self.page_size),
        }
    }

    /// Offset 0 starts a fresh load that replaces the working set
    pub fn is_fresh(&self) -> bool {
        self.offset == 0
    }

    /// Reject empty pages
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::InvalidOperation("page_size must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// One page of chats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatPage {
    /// Chats in server order
    pub chats: Vec<Chat>,
    /// Whether more chats follow this page
    pub has_more: bool,
}

/// Cursor into a chat's message history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCursor {
    /// Resume strictly after this message; `None` starts from the beginning
    pub last_message_id: Option<MessageId>,
    /// Number of messages to return
    pub page_size: u32,
}

impl MessageCursor {
    /// Cursor at the beginning of the history
    pub fn start(page_size: u32) -> Self {
        Self {
            last_message_id: None,
            page_size,
        }
    }

    /// Reject empty pages
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::InvalidOperation("page_size must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// Cursor returned with a page of messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextCursor {
    /// Last message of the returned page, if any
    pub last_message_id: Option<MessageId>,
    /// Page size of the request
    pub page_size: u32,
    /// Whether more messages follow
    pub has_next_message: bool,
}

impl NextCursor {
    /// Cursor to request the following page
    pub fn to_request(&self) -> MessageCursor {
        MessageCursor {
            last_message_id: self.last_message_id.clone(),
            page_size: self.page_size,
        }
    }
}

/// One page of a chat's message history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePage {
    /// Messages in chronological order
    pub messages: Vec<Message>,
    /// Where the next page starts
    pub cursor: NextCursor,
}
