//! Conversation state and its reconciliation rules
//!
//! `StoreState` is the synchronous core of the store. Every rule that folds a
//! service response or a local edit into the state lives here as a plain
//! `&mut self` method, so the async command layer only has to decide *when*
//! to call them. Methods always derive their changes from the current state,
//! never from values captured before a suspension point.

use crate::service::{ChatFilter, ChatPage, MessagePage, PageRequest};
use crate::store::bookmark::BookmarkedMessage;
use crate::store::chat::{Chat, ChatId};
use crate::store::message::{DeliveryStatus, Message, MessageId, UserId};
use crate::store::ordering::ChatOrdering;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Ticket issued when a chat listing request starts
///
/// Responses are applied only if no newer fresh load has been applied since
/// the ticket was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingTicket {
    /// Monotonic request token
    pub token: u64,
    /// Filter context of the request
    pub filter: ChatFilter,
    /// Whether this is a fresh (offset 0) load
    pub fresh: bool,
}

/// Outcome of folding a listing response into the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The page was merged
    Applied {
        /// Whether the service has more chats after this page
        has_more: bool,
    },
    /// A newer listing was applied first; this response was dropped
    Superseded,
}

/// Consecutive messages from one sender
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageGroup {
    /// Sender of every message in the group
    pub sender_id: UserId,
    /// Messages in thread order
    pub messages: Vec<Message>,
}

/// Cloned view of the state for rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreSnapshot {
    /// Chats in display order
    pub chats: Vec<Chat>,
    /// Thread per chat
    pub messages_by_chat: HashMap<ChatId, Vec<Message>>,
    /// Bookmarked-message projections in bookmark order
    pub bookmarked_messages: Vec<BookmarkedMessage>,
    /// Currently open chat
    pub selected_chat_id: Option<ChatId>,
    /// Filter context of the chat working set
    pub active_filter: ChatFilter,
}

impl StoreSnapshot {
    /// Chat by id
    pub fn chat(&self, chat_id: ChatId) -> Option<&Chat> {
        self.chats.iter().find(|c| c.chat_id == chat_id)
    }

    /// Thread of a chat (empty if never loaded)
    pub fn messages(&self, chat_id: ChatId) -> &[Message] {
        self.messages_by_chat.get(&chat_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The open chat, if it is in the working set
    pub fn selected_chat(&self) -> Option<&Chat> {
        self.selected_chat_id.and_then(|id| self.chat(id))
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RequestTokens {
    issued: u64,
    applied: u64,
}

impl RequestTokens {
    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn is_current(&self, token: u64) -> bool {
        token > self.applied
    }
}

/// In-memory conversation state
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    chats: Vec<Chat>,
    messages_by_chat: HashMap<ChatId, Vec<Message>>,
    bookmarked_messages: Vec<BookmarkedMessage>,
    selected_chat_id: Option<ChatId>,
    pinned_chat_ids: HashSet<ChatId>,
    active_filter: ChatFilter,
    ordering: ChatOrdering,
    listing_tokens: RequestTokens,
    message_tokens: HashMap<ChatId, RequestTokens>,
}

impl StoreState {
    /// Create an empty state using `ordering` for promotions
    pub fn new(ordering: ChatOrdering) -> Self {
        Self {
            ordering,
            ..Self::default()
        }
    }

    // ========== Views ==========

    /// Chats in display order
    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    /// Chat by id
    pub fn chat(&self, chat_id: ChatId) -> Option<&Chat> {
        self.chats.iter().find(|c| c.chat_id == chat_id)
    }

    fn chat_mut(&mut self, chat_id: ChatId) -> Option<&mut Chat> {
        self.chats.iter_mut().find(|c| c.chat_id == chat_id)
    }

    /// Thread of a chat (empty if never loaded)
    pub fn messages(&self, chat_id: ChatId) -> &[Message] {
        self.messages_by_chat.get(&chat_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Bookmarked-message projections in bookmark order
    pub fn bookmarked_messages(&self) -> &[BookmarkedMessage] {
        &self.bookmarked_messages
    }

    /// Currently open chat
    pub fn selected_chat_id(&self) -> Option<ChatId> {
        self.selected_chat_id
    }

    /// Filter context of the chat working set
    pub fn active_filter(&self) -> ChatFilter {
        self.active_filter
    }

    /// Ordering policy used for promotions
    pub fn ordering(&self) -> ChatOrdering {
        self.ordering
    }

    /// Polling watermark: the newest server-assigned message id of a chat
    ///
    /// Temporary ids of local messages are skipped; the service does not
    /// order them relative to messages it received in the meantime. Falls
    /// back to the chat's `last_message` summary when the thread holds no
    /// server id.
    pub fn last_message_id(&self, chat_id: ChatId) -> Option<MessageId> {
        self.messages(chat_id)
            .iter()
            .rev()
            .find(|m| !m.id.is_local())
            .map(|m| m.id.clone())
            .or_else(|| {
                self.chat(chat_id)
                    .map(|c| c.last_message.id.clone())
                    .filter(|id| !id.is_local())
            })
    }

    /// Group a thread into runs of consecutive messages by sender
    pub fn grouped_messages(&self, chat_id: ChatId) -> Vec<MessageGroup> {
        let mut groups: Vec<MessageGroup> = Vec::new();
        for message in self.messages(chat_id) {
            match groups.last_mut() {
                Some(group) if group.sender_id == message.sender_id => group.messages.push(message.clone()),
                _ => groups.push(MessageGroup {
                    sender_id: message.sender_id,
                    messages: vec![message.clone()],
                }),
            }
        }
        groups
    }

    /// Clone everything the presentation layer renders
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            chats: self.chats.clone(),
            messages_by_chat: self.messages_by_chat.clone(),
            bookmarked_messages: self.bookmarked_messages.clone(),
            selected_chat_id: self.selected_chat_id,
            active_filter: self.active_filter,
        }
    }

    // ========== Chat listing ==========

    /// Issue a ticket for a listing request
    pub fn begin_chat_listing(&mut self, filter: ChatFilter, page: PageRequest) -> ListingTicket {
        ListingTicket {
            token: self.listing_tokens.issue(),
            filter,
            fresh: page.is_fresh(),
        }
    }

    /// Fold a listing response into the working set
    ///
    /// A fresh page replaces the working set; a later page is accumulated
    /// into it. Either way each `chat_id` appears at most once, the first
    /// occurrence keeps its identity, server fields win for content, and
    /// the client-local pin survives.
    pub fn apply_chat_page(&mut self, ticket: ListingTicket, page: ChatPage) -> Reconciled {
        if !self.listing_tokens.is_current(ticket.token) {
            debug!(token = ticket.token, "Dropping superseded chat listing");
            return Reconciled::Superseded;
        }
        if !ticket.fresh && ticket.filter != self.active_filter {
            debug!(token = ticket.token, "Dropping page for an inactive filter context");
            return Reconciled::Superseded;
        }

        let mut working_set = if ticket.fresh { Vec::new() } else { std::mem::take(&mut self.chats) };

        for mut incoming in page.chats {
            incoming.pinned = self.pinned_chat_ids.contains(&incoming.chat_id);
            incoming.normalize_read_state();

            match working_set.iter_mut().find(|c| c.chat_id == incoming.chat_id) {
                Some(existing) => existing.adopt_server_fields(&incoming),
                None => working_set.push(incoming),
            }
        }

        self.ordering.sort(&mut working_set);
        self.chats = working_set;

        if ticket.fresh {
            self.listing_tokens.applied = ticket.token;
            self.active_filter = ticket.filter;
        }

        Reconciled::Applied {
            has_more: page.has_more,
        }
    }

    /// Refresh status fields of known chats without touching the order
    ///
    /// Chats absent from `server_chats` are left untouched. Returns the
    /// number of local chats refreshed.
    pub fn merge_chat_status(&mut self, server_chats: &[Chat]) -> usize {
        let mut refreshed = 0;
        for server in server_chats {
            if let Some(local) = self.chat_mut(server.chat_id) {
                local.merge_status_from(server);
                refreshed += 1;
            }
        }
        refreshed
    }

    // ========== Selection and read state ==========

    /// Open a chat; returns the previously open chat
    pub fn select_chat(&mut self, chat_id: ChatId) -> Option<ChatId> {
        self.selected_chat_id.replace(chat_id)
    }

    /// Apply a confirmed read-state change
    ///
    /// Both directions reset `unread_count` to 0. Returns false if the chat
    /// is not in the working set.
    pub fn apply_read_state(&mut self, chat_id: ChatId, read: bool) -> bool {
        match self.chat_mut(chat_id) {
            Some(chat) => {
                chat.set_read_state(read);
                true
            }
            None => false,
        }
    }

    // ========== Message threads ==========

    /// Issue a token for a message-history request
    pub fn begin_message_load(&mut self, chat_id: ChatId) -> u64 {
        self.message_tokens.entry(chat_id).or_default().issue()
    }

    /// Replace a chat's thread with a loaded page
    ///
    /// Bookmark flags are re-applied from the bookmark projections, and
    /// local messages the page does not contain yet stay at the end of the
    /// thread. Returns false if a newer load was applied first.
    pub fn apply_message_page(&mut self, chat_id: ChatId, token: u64, page: MessagePage) -> bool {
        let tokens = self.message_tokens.entry(chat_id).or_default();
        if !tokens.is_current(token) {
            debug!(chat_id, token, "Dropping superseded message page");
            return false;
        }
        tokens.applied = token;

        let mut thread: Vec<Message> = Vec::with_capacity(page.messages.len());
        for mut message in page.messages {
            if thread.iter().any(|m| m.id == message.id) {
                continue;
            }
            message.bookmarked = self
                .bookmarked_messages
                .iter()
                .any(|b| b.refers_to(chat_id, &message.id));
            thread.push(message);
        }

        let unconfirmed: Vec<Message> = self
            .messages(chat_id)
            .iter()
            .filter(|m| m.id.is_local() && !thread.iter().any(|t| t.id == m.id))
            .cloned()
            .collect();
        thread.extend(unconfirmed);

        self.messages_by_chat.insert(chat_id, thread);
        true
    }

    /// Append a locally composed message and surface its chat
    pub fn append_local_message(&mut self, chat_id: ChatId, message: Message) {
        if let Some(chat) = self.chat_mut(chat_id) {
            chat.set_last_message(&message);
            chat.unread_count = 0;
        }
        self.messages_by_chat.entry(chat_id).or_default().push(message);
        self.ordering.promote(&mut self.chats, chat_id);
    }

    /// Mark a local message delivered, matching it by id
    ///
    /// Returns false if the message is no longer in the thread.
    pub fn confirm_delivery(&mut self, chat_id: ChatId, message_id: &MessageId) -> bool {
        let Some(message) = self
            .messages_by_chat
            .get_mut(&chat_id)
            .and_then(|thread| thread.iter_mut().find(|m| &m.id == message_id))
        else {
            return false;
        };
        message.mark_delivered();

        if let Some(chat) = self.chat_mut(chat_id) {
            if &chat.last_message.id == message_id {
                chat.last_message.status = DeliveryStatus::Delivered;
            }
        }
        true
    }

    /// Add polled messages and update the chat's unread bookkeeping
    ///
    /// Messages already present in the thread are skipped (the service
    /// delivers at least once). Each new message lands before the trailing
    /// local messages created after it, so the thread stays in time order.
    /// Returns the number added.
    pub fn apply_polled_messages(&mut self, chat_id: ChatId, polled: Vec<Message>) -> usize {
        let known = self.messages(chat_id);
        let mut fresh: Vec<Message> = Vec::new();
        for message in polled {
            if known.iter().any(|m| m.id == message.id) || fresh.iter().any(|m| m.id == message.id) {
                continue;
            }
            fresh.push(message);
        }
        if fresh.is_empty() {
            return 0;
        }
        let count = fresh.len();

        let thread = self.messages_by_chat.entry(chat_id).or_default();
        for message in fresh {
            let mut at = thread.len();
            while at > 0 && thread[at - 1].id.is_local() && thread[at - 1].created_at > message.created_at {
                at -= 1;
            }
            thread.insert(at, message);
        }
        let newest = thread.last().cloned();

        let is_selected = self.selected_chat_id == Some(chat_id);
        if let Some(chat) = self.chat_mut(chat_id) {
            if let Some(newest) = &newest {
                chat.set_last_message(newest);
            }
            if is_selected {
                chat.set_read_state(true);
            } else {
                chat.add_unread(u32::try_from(count).unwrap_or(u32::MAX));
            }
        }
        self.ordering.promote(&mut self.chats, chat_id);

        count
    }

    // ========== Pins and bookmarks ==========

    /// Flip a chat's pin and re-sort with the canonical comparator
    ///
    /// Returns the new pin state, or `None` if the chat is unknown.
    pub fn toggle_pin(&mut self, chat_id: ChatId) -> Option<bool> {
        let chat = self.chat_mut(chat_id)?;
        chat.pinned = !chat.pinned;
        let pinned = chat.pinned;

        if pinned {
            self.pinned_chat_ids.insert(chat_id);
        } else {
            self.pinned_chat_ids.remove(&chat_id);
        }
        self.ordering.sort(&mut self.chats);

        Some(pinned)
    }

    /// Flip a chat-level bookmark; no ordering effect
    pub fn toggle_chat_bookmark(&mut self, chat_id: ChatId) -> Option<bool> {
        let chat = self.chat_mut(chat_id)?;
        chat.bookmark = !chat.bookmark;
        Some(chat.bookmark)
    }

    /// Flip a message bookmark and maintain its projection
    ///
    /// Returns the new flag, or `None` if the message is not in the thread.
    pub fn toggle_message_bookmark(&mut self, chat_id: ChatId, message_id: &MessageId) -> Option<bool> {
        let message = self
            .messages_by_chat
            .get_mut(&chat_id)?
            .iter_mut()
            .find(|m| &m.id == message_id)?;
        message.bookmarked = !message.bookmarked;
        let bookmarked = message.bookmarked;
        let message = message.clone();

        if bookmarked {
            let already_projected = self
                .bookmarked_messages
                .iter()
                .any(|b| b.refers_to(chat_id, message_id));
            if !already_projected {
                let projection = BookmarkedMessage::project(chat_id, &message, self.chat(chat_id));
                self.bookmarked_messages.push(projection);
            }
        } else {
            self.bookmarked_messages.retain(|b| !b.refers_to(chat_id, message_id));
        }

        Some(bookmarked)
    }

    // ========== Invariants ==========

    /// Check every structural invariant and derived view against its source
    pub fn verify_invariants(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for chat in &self.chats {
            if !seen.insert(chat.chat_id) {
                return Err(violation(format!("duplicate chat {}", chat.chat_id)));
            }
            if chat.read && chat.unread_count != 0 {
                return Err(violation(format!(
                    "chat {} is read with {} unread",
                    chat.chat_id, chat.unread_count
                )));
            }
            if chat.pinned != self.pinned_chat_ids.contains(&chat.chat_id) {
                return Err(violation(format!("chat {} pin flag out of sync", chat.chat_id)));
            }
        }

        if self.ordering == ChatOrdering::PinnedFirst && !ChatOrdering::pinned_first_holds(&self.chats) {
            return Err(violation("unpinned chat ordered before a pinned chat".to_string()));
        }

        for (chat_id, thread) in &self.messages_by_chat {
            let mut ids = HashSet::new();
            for message in thread {
                if !ids.insert(&message.id) {
                    return Err(violation(format!("duplicate message {} in chat {}", message.id, chat_id)));
                }
                if message.bookmarked
                    && !self.bookmarked_messages.iter().any(|b| b.refers_to(*chat_id, &message.id))
                {
                    return Err(violation(format!("bookmarked message {} has no projection", message.id)));
                }
            }
            if thread.windows(2).any(|w| w[1].created_at < w[0].created_at) {
                return Err(violation(format!("chat {} thread is not in time order", chat_id)));
            }
        }

        let mut projected = HashSet::new();
        for bookmark in &self.bookmarked_messages {
            if !projected.insert((bookmark.chat_id, &bookmark.id)) {
                return Err(violation(format!("duplicate bookmark projection {}", bookmark.id)));
            }
            let source = self.messages(bookmark.chat_id).iter().find(|m| m.id == bookmark.id);
            if let Some(source) = source {
                if !source.bookmarked
                    || source.content != bookmark.content
                    || source.created_at != bookmark.created_at
                {
                    return Err(violation(format!("bookmark projection {} diverged from its message", bookmark.id)));
                }
            }
        }

        Ok(())
    }
}

fn violation(detail: String) -> Error {
    Error::InvariantViolation(detail)
}
