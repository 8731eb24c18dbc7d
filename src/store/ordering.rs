//! Chat ordering policy
//!
//! Two rules compete for the chat list order:
//! - the canonical comparator (pinned chats first, then most recent
//!   `last_message` first), applied on fresh loads and pin toggles
//! - promotion of a freshly active chat (local send, polled messages) to
//!   the front
//!
//! [`ChatOrdering`] names how the two are reconciled and every ordering
//! decision in the store goes through it.

use crate::store::chat::{Chat, ChatId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How promotion of an active chat interacts with pinning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatOrdering {
    /// Active chats move to the front of their pin group; pinned chats always
    /// stay ahead of unpinned ones
    #[default]
    PinnedFirst,
    /// Active chats move to the absolute front, even ahead of pinned chats
    ActivityFirst,
}

impl ChatOrdering {
    /// Canonical comparator: pinned before unpinned, then newest first
    ///
    /// Ties on timestamp fall back to ascending `chat_id` so the result does
    /// not depend on the order the list was in before sorting.
    pub fn compare(a: &Chat, b: &Chat) -> Ordering {
        b.pinned
            .cmp(&a.pinned)
            .then_with(|| b.last_message.created_at.cmp(&a.last_message.created_at))
            .then_with(|| a.chat_id.cmp(&b.chat_id))
    }

    /// Stable re-sort of the whole list with the canonical comparator
    pub fn sort(&self, chats: &mut [Chat]) {
        chats.sort_by(Self::compare);
    }

    /// Move `chat_id` to the front according to this policy
    ///
    /// Returns false when the chat is not in the list.
    pub fn promote(&self, chats: &mut Vec<Chat>, chat_id: ChatId) -> bool {
        let Some(index) = chats.iter().position(|c| c.chat_id == chat_id) else {
            return false;
        };
        let chat = chats.remove(index);
        let target = match self {
            Self::ActivityFirst => 0,
            Self::PinnedFirst if chat.pinned => 0,
            Self::PinnedFirst => chats.iter().take_while(|c| c.pinned).count(),
        };
        chats.insert(target, chat);
        true
    }

    /// Whether `chats` satisfies the pinned-first invariant
    pub fn pinned_first_holds(chats: &[Chat]) -> bool {
        chats.windows(2).all(|w| w[0].pinned || !w[1].pinned)
    }
}
