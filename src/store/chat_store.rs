//! Async command interface of the conversation store
//!
//! `ChatStore` owns the state for the lifetime of the client session and is
//! the only way the presentation layer changes it. Commands that call the
//! service suspend at the call boundary, so other commands may interleave.
//! The write lock is only taken for synchronous mutation blocks and is
//! always released before awaiting the service; each resumed command
//! re-reads the current state before mutating it.

use crate::event::StoreEvent;
use crate::service::{ChatFilter, ChatService, MessageCursor, NextCursor, PageRequest};
use crate::store::bookmark::BookmarkedMessage;
use crate::store::chat::{Chat, ChatId};
use crate::store::message::{Message, MessageId};
use crate::store::settings::Settings;
use crate::store::state::{MessageGroup, Reconciled, StoreSnapshot, StoreState};
use crate::{Error, Result};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Conversation store shared by the presentation layer
///
/// Cloning is cheap; clones share the same state, service and event channel.
///
/// # Example
/// ```rust,no_run
/// use inbox::service::{ChatFilter, MockChatService, PageRequest};
/// use inbox::store::{ChatStore, Settings};
/// use std::sync::Arc;
///
/// # async fn example() -> inbox::Result<()> {
/// let store = ChatStore::new(Arc::new(MockChatService::instant()), Settings::default());
/// let mut events = store.subscribe();
///
/// store.load_chats(ChatFilter::all(), PageRequest::first(20)).await?;
/// store.select_chat(10000).await?;
/// store.send_message(10000, "hello").await;
///
/// while let Ok(event) = events.try_recv() {
///     println!("{:?}", event);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ChatStore {
    state: Arc<RwLock<StoreState>>,
    service: Arc<dyn ChatService>,
    events: broadcast::Sender<StoreEvent>,
    settings: Arc<Settings>,
}

impl std::fmt::Debug for ChatStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatStore")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ChatStore {
    /// Create a store backed by `service`
    pub fn new(service: Arc<dyn ChatService>, settings: Settings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(StoreState::new(settings.ordering))),
            service,
            events,
            settings: Arc::new(settings),
        }
    }

    /// Subscribe to store notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Settings the store was created with
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    // ========== Chat listing ==========

    /// Load one page of the chat listing
    ///
    /// Offset 0 replaces the working set for `filter`; later offsets
    /// accumulate into it. On service failure the state is left unchanged
    /// and the error is returned. A response that resolves after a newer
    /// fresh load has been applied is dropped and reported as
    /// [`Reconciled::Superseded`].
    pub async fn load_chats(&self, filter: ChatFilter, page: PageRequest) -> Result<Reconciled> {
        page.validate()?;

        let ticket = self.state.write().await.begin_chat_listing(filter, page);
        debug!(token = ticket.token, ?filter, offset = page.offset, "Loading chats");

        let response = self.service.list_chats(filter, page).await.map_err(|e| {
            warn!("Failed to load chats ({:?}, offset {}): {}", filter, page.offset, e);
            e
        })?;

        let (outcome, count) = {
            let mut state = self.state.write().await;
            let outcome = state.apply_chat_page(ticket, response);
            (outcome, state.chats().len())
        };

        match outcome {
            Reconciled::Applied { has_more } => {
                info!("Loaded chats ({:?}): {} in working set, more: {}", filter, count, has_more);
                self.emit(StoreEvent::ChatsLoaded { filter, count });
            }
            Reconciled::Superseded => {
                warn!("Dropped superseded chat listing ({:?}, offset {})", filter, page.offset);
                self.emit(StoreEvent::ListingSuperseded);
            }
        }

        Ok(outcome)
    }

    /// Refresh read/unread/last-message/bookmark fields from the first page
    ///
    /// Order and pins are untouched; chats missing from the page are left as
    /// they are. Returns the number of chats refreshed.
    pub async fn sync_chats_status(&self) -> Result<usize> {
        let page = PageRequest::first(self.settings.chat_page_size);
        let response = self.service.list_chats(ChatFilter::all(), page).await.map_err(|e| {
            warn!("Chat status sync failed: {}", e);
            e
        })?;

        let refreshed = self.state.write().await.merge_chat_status(&response.chats);
        debug!("Synced status of {} chats", refreshed);
        self.emit(StoreEvent::ChatsSynced { refreshed });

        Ok(refreshed)
    }

    // ========== Selection and read state ==========

    /// Open a chat: load the first page of its history, then mark it read
    ///
    /// Both steps run even if the first fails; the first error is returned.
    pub async fn select_chat(&self, chat_id: ChatId) -> Result<()> {
        self.state.write().await.select_chat(chat_id);
        info!("Selected chat {}", chat_id);
        self.emit(StoreEvent::ChatSelected(chat_id));

        let loaded = self
            .load_messages(chat_id, MessageCursor::start(self.settings.message_page_size))
            .await;
        let marked = self.mark_chat_read(chat_id).await;

        loaded.and(marked)
    }

    /// Mark a chat read on the service, then locally
    pub async fn mark_chat_read(&self, chat_id: ChatId) -> Result<()> {
        self.set_read_state(chat_id, true).await
    }

    /// Mark a chat unread on the service, then locally
    ///
    /// The unread count is reset to 0; only the flag flips.
    pub async fn mark_chat_unread(&self, chat_id: ChatId) -> Result<()> {
        self.set_read_state(chat_id, false).await
    }

    async fn set_read_state(&self, chat_id: ChatId, read: bool) -> Result<()> {
        self.service.set_read_state(chat_id, read).await.map_err(|e| {
            warn!("Failed to set chat {} read={}: {}", chat_id, read, e);
            e
        })?;

        if self.state.write().await.apply_read_state(chat_id, read) {
            debug!("Chat {} read={}", chat_id, read);
            self.emit(StoreEvent::ChatUpdated(chat_id));
        }
        Ok(())
    }

    // ========== Message threads ==========

    /// Load a page of a chat's history, replacing its thread
    ///
    /// Returns the cursor for the following page, or `None` when a newer
    /// load for the same chat was applied first.
    pub async fn load_messages(&self, chat_id: ChatId, cursor: MessageCursor) -> Result<Option<NextCursor>> {
        cursor.validate()?;

        let token = self.state.write().await.begin_message_load(chat_id);
        let page = self.service.list_messages(chat_id, cursor).await.map_err(|e| {
            warn!("Failed to load messages of chat {}: {}", chat_id, e);
            e
        })?;

        let next = page.cursor.clone();
        let count = page.messages.len();
        if !self.state.write().await.apply_message_page(chat_id, token, page) {
            warn!("Dropped superseded message page for chat {}", chat_id);
            return Ok(None);
        }

        debug!("Loaded {} messages for chat {}, more: {}", count, chat_id, next.has_next_message);
        self.emit(StoreEvent::MessagesLoaded(chat_id));
        Ok(Some(next))
    }

    /// Send a message optimistically
    ///
    /// The message is appended with a temporary id and status `SENT` before
    /// the service is called, and its chat moves to the front. When the
    /// service confirms, the same message turns `DELIVERED` in place. A
    /// failed delivery leaves it `SENT` (no retry, no rollback) and is
    /// reported as [`StoreEvent::DeliveryFailed`].
    ///
    /// Whitespace-only content is ignored. Returns the temporary id.
    pub async fn send_message(&self, chat_id: ChatId, content: &str) -> Option<MessageId> {
        let content = content.trim();
        if content.is_empty() {
            debug!("Ignoring empty message for chat {}", chat_id);
            return None;
        }

        let message = Message::new_local(content);
        let message_id = message.id.clone();

        self.state.write().await.append_local_message(chat_id, message.clone());
        self.emit(StoreEvent::MessageSent {
            chat_id,
            message_id: message_id.clone(),
        });

        match self.service.deliver_message(chat_id, &message).await {
            Ok(()) => {
                if self.state.write().await.confirm_delivery(chat_id, &message_id) {
                    info!("Message {} delivered to chat {}", message_id, chat_id);
                    self.emit(StoreEvent::MessageDelivered {
                        chat_id,
                        message_id: message_id.clone(),
                    });
                } else {
                    debug!("Delivered message {} is no longer in chat {}", message_id, chat_id);
                }
            }
            Err(e) => {
                warn!("Message {} to chat {} not delivered: {}", message_id, chat_id, e);
                self.emit(StoreEvent::DeliveryFailed {
                    chat_id,
                    message_id: message_id.clone(),
                    reason: e.to_string(),
                });
            }
        }

        Some(message_id)
    }

    /// Fetch messages newer than `last_message_id` and append them
    ///
    /// Unless the chat is open, its unread count grows by the number of new
    /// messages; an open chat stays read. Failures are logged and reported
    /// as [`StoreEvent::PollFailed`]. Returns the number of messages appended.
    pub async fn poll_messages(&self, chat_id: ChatId, last_message_id: &MessageId) -> usize {
        let polled = match self.service.poll_messages(chat_id, last_message_id).await {
            Ok(polled) => polled,
            Err(e) => {
                warn!("Polling chat {} failed: {}", chat_id, e);
                self.emit(StoreEvent::PollFailed {
                    chat_id,
                    reason: e.to_string(),
                });
                return 0;
            }
        };

        let count = self.state.write().await.apply_polled_messages(chat_id, polled);
        if count > 0 {
            info!("Polled {} new messages for chat {}", count, chat_id);
            self.emit(StoreEvent::MessagesPolled { chat_id, count });
        }
        count
    }

    /// Poll the open chat from its newest known message
    ///
    /// Returns 0 when no chat is open or nothing is known about it yet.
    pub async fn poll_selected(&self) -> usize {
        let watermark = {
            let state = self.state.read().await;
            state
                .selected_chat_id()
                .and_then(|chat_id| state.last_message_id(chat_id).map(|id| (chat_id, id)))
        };
        match watermark {
            Some((chat_id, last_message_id)) => self.poll_messages(chat_id, &last_message_id).await,
            None => 0,
        }
    }

    // ========== Pins and bookmarks ==========

    /// Flip a chat's pin and re-sort the list; returns the new pin state
    pub async fn pin_chat(&self, chat_id: ChatId) -> Result<bool> {
        let pinned = self
            .state
            .write()
            .await
            .toggle_pin(chat_id)
            .ok_or(Error::ChatNotFound(chat_id))?;

        debug!("Chat {} pinned={}", chat_id, pinned);
        self.emit(StoreEvent::ChatUpdated(chat_id));
        Ok(pinned)
    }

    /// Flip a chat-level bookmark; returns the new flag
    pub async fn toggle_chat_bookmark(&self, chat_id: ChatId) -> Result<bool> {
        let bookmark = self
            .state
            .write()
            .await
            .toggle_chat_bookmark(chat_id)
            .ok_or(Error::ChatNotFound(chat_id))?;

        self.emit(StoreEvent::ChatUpdated(chat_id));
        Ok(bookmark)
    }

    /// Flip a message bookmark; returns the new flag
    pub async fn toggle_message_bookmark(&self, chat_id: ChatId, message_id: &MessageId) -> Result<bool> {
        let bookmarked = self
            .state
            .write()
            .await
            .toggle_message_bookmark(chat_id, message_id)
            .ok_or_else(|| {
                Error::InvalidOperation(format!("Message {} not found in chat {}", message_id, chat_id))
            })?;

        self.emit(StoreEvent::BookmarksChanged);
        Ok(bookmarked)
    }

    // ========== Views ==========

    /// Chats in display order
    pub async fn chats(&self) -> Vec<Chat> {
        self.state.read().await.chats().to_vec()
    }

    /// Chat by id
    pub async fn chat(&self, chat_id: ChatId) -> Option<Chat> {
        self.state.read().await.chat(chat_id).cloned()
    }

    /// Thread of a chat
    pub async fn messages(&self, chat_id: ChatId) -> Vec<Message> {
        self.state.read().await.messages(chat_id).to_vec()
    }

    /// Thread of a chat grouped by consecutive sender
    pub async fn grouped_messages(&self, chat_id: ChatId) -> Vec<MessageGroup> {
        self.state.read().await.grouped_messages(chat_id)
    }

    /// Bookmarked-message collection
    pub async fn bookmarked_messages(&self) -> Vec<BookmarkedMessage> {
        self.state.read().await.bookmarked_messages().to_vec()
    }

    /// Currently open chat
    pub async fn selected_chat_id(&self) -> Option<ChatId> {
        self.state.read().await.selected_chat_id()
    }

    /// Newest known message id of a chat
    pub async fn last_message_id(&self, chat_id: ChatId) -> Option<MessageId> {
        self.state.read().await.last_message_id(chat_id)
    }

    /// Everything the presentation layer renders, cloned
    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.snapshot()
    }

    /// Check the state's invariants
    pub async fn verify_invariants(&self) -> Result<()> {
        self.state.read().await.verify_invariants()
    }
}
