//! Core types for TUI screens and navigation

use crate::service::ChatFilter;

/// Application screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Inbox tabs with the chat list
    ChatList,
    /// Individual chat window
    ChatView,
}

/// Inbox tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Every conversation
    #[default]
    All,
    /// Conversations with unread messages
    Unread,
    /// Bookmarked conversations and messages
    Bookmarks,
}

impl Tab {
    /// Get all tabs in display order
    pub fn all() -> Vec<Self> {
        vec![Self::All, Self::Unread, Self::Bookmarks]
    }

    /// Get display label for the tab
    pub fn label(&self) -> &str {
        match self {
            Self::All => "All",
            Self::Unread => "Unread",
            Self::Bookmarks => "Bookmarks",
        }
    }

    /// Listing filter the tab loads chats with
    pub fn filter(&self) -> ChatFilter {
        match self {
            Self::All => ChatFilter::all(),
            Self::Unread => ChatFilter::unread(),
            Self::Bookmarks => ChatFilter::bookmarked(),
        }
    }

    /// Position in [`Tab::all`]
    pub fn index(&self) -> usize {
        match self {
            Self::All => 0,
            Self::Unread => 1,
            Self::Bookmarks => 2,
        }
    }

    /// Tab to the right, wrapping around
    pub fn next(&self) -> Self {
        match self {
            Self::All => Self::Unread,
            Self::Unread => Self::Bookmarks,
            Self::Bookmarks => Self::All,
        }
    }

    /// Tab to the left, wrapping around
    pub fn previous(&self) -> Self {
        match self {
            Self::All => Self::Bookmarks,
            Self::Unread => Self::All,
            Self::Bookmarks => Self::Unread,
        }
    }
}
