//! Main TUI application state and logic
//!
//! Key handlers never wait on the service: every store command is spawned on
//! the tokio runtime and the screen is redrawn from a fresh snapshot whenever
//! the store broadcasts a change.

use crate::event::StoreEvent;
use crate::service::PageRequest;
use crate::store::{Chat, ChatId, ChatStore, Message, StoreSnapshot};
use crate::tui::screens::{ChatListScreen, ChatViewScreen};
use crate::tui::types::{Screen, Tab};
use std::future::Future;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Application state
pub struct App {
    /// Current screen
    pub current_screen: Screen,
    /// Should quit
    pub should_quit: bool,
    /// Conversation store
    pub store: ChatStore,
    /// Last rendered copy of the store
    pub snapshot: StoreSnapshot,
    /// Chat list screen
    pub chat_list_screen: ChatListScreen,
    /// Chat view screen (when a chat is open)
    pub chat_view_screen: Option<ChatViewScreen>,
    events: broadcast::Receiver<StoreEvent>,
    notices_tx: mpsc::UnboundedSender<String>,
    notices_rx: mpsc::UnboundedReceiver<String>,
    tasks: Vec<JoinHandle<()>>,
}

impl App {
    /// Create new application over `store`
    ///
    /// Must be called inside a tokio runtime; commands are spawned on it.
    pub fn new(store: ChatStore) -> Self {
        let events = store.subscribe();
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();

        Self {
            current_screen: Screen::ChatList,
            should_quit: false,
            store,
            snapshot: StoreSnapshot::default(),
            chat_list_screen: ChatListScreen::new(),
            chat_view_screen: None,
            events,
            notices_tx,
            notices_rx,
            tasks: Vec::new(),
        }
    }

    fn spawn_command<F>(&mut self, label: &'static str, command: F)
    where
        F: Future<Output = crate::Result<()>> + Send + 'static,
    {
        let notices = self.notices_tx.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = command.await {
                let _ = notices.send(format!("{} failed: {}", label, e));
            }
        });

        self.tasks.retain(|task| !task.is_finished());
        self.tasks.push(handle);
    }

    // ========== Store synchronisation ==========

    /// Re-read the store
    pub async fn refresh(&mut self) {
        self.snapshot = self.store.snapshot().await;
        self.chat_list_screen.clamp(self.snapshot.chats.len());
    }

    /// Drain store events and command failures into status lines
    ///
    /// Returns true if anything arrived, meaning the snapshot is stale.
    pub fn process_events(&mut self) -> bool {
        let mut changed = false;

        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.apply_event(event);
                    changed = true;
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    debug!("Skipped {} store events", skipped);
                    changed = true;
                }
                Err(_) => break,
            }
        }

        while let Ok(notice) = self.notices_rx.try_recv() {
            warn!("{}", notice);
            self.set_status(notice);
            changed = true;
        }

        changed
    }

    fn apply_event(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::DeliveryFailed { reason, .. } => {
                self.set_status(format!("Message not delivered: {}", reason));
            }
            StoreEvent::PollFailed { reason, .. } => {
                self.set_status(format!("Could not fetch new messages: {}", reason));
            }
            StoreEvent::MessagesPolled { chat_id, count } => {
                let name = self
                    .snapshot
                    .chat(chat_id)
                    .map(Chat::display_name)
                    .unwrap_or_else(|| format!("chat {}", chat_id));
                self.chat_list_screen
                    .set_status(format!("{} new message(s) from {}", count, name));
            }
            _ => {}
        }
    }

    fn set_status(&mut self, message: String) {
        match &mut self.chat_view_screen {
            Some(screen) if self.current_screen == Screen::ChatView => screen.set_status(message),
            _ => self.chat_list_screen.set_status(message),
        }
    }

    /// Wait for every spawned command, then refresh
    pub async fn settle(&mut self) {
        for task in std::mem::take(&mut self.tasks) {
            if let Err(e) = task.await {
                warn!("Command task ended abnormally: {}", e);
            }
        }
        self.process_events();
        self.refresh().await;
    }

    // ========== Views ==========

    /// Chat under the list cursor
    pub fn highlighted_chat(&self) -> Option<&Chat> {
        self.snapshot.chats.get(self.chat_list_screen.selected_index)
    }

    /// Chat shown in the chat view
    pub fn open_chat(&self) -> Option<&Chat> {
        self.chat_view_screen
            .as_ref()
            .and_then(|screen| self.snapshot.chat(screen.chat_id))
    }

    /// Thread of the open chat
    pub fn open_messages(&self) -> &[Message] {
        match &self.chat_view_screen {
            Some(screen) => self.snapshot.messages(screen.chat_id),
            None => &[],
        }
    }

    fn page_size(&self) -> u32 {
        self.store.settings().chat_page_size
    }

    // ========== Chat list commands ==========

    /// Load the first page of the active tab
    pub fn load_current_tab(&mut self) {
        let store = self.store.clone();
        let filter = self.chat_list_screen.tab.filter();
        let page = PageRequest::first(self.page_size());
        self.spawn_command("Loading chats", async move { store.load_chats(filter, page).await.map(|_| ()) });
    }

    /// Load the page after the chats already shown
    pub fn load_more_chats(&mut self) {
        let store = self.store.clone();
        let filter = self.snapshot.active_filter;
        let page = PageRequest {
            page_size: self.page_size(),
            offset: u32::try_from(self.snapshot.chats.len()).unwrap_or(u32::MAX),
        };
        self.spawn_command("Loading more chats", async move { store.load_chats(filter, page).await.map(|_| ()) });
    }

    /// Switch to `tab` and load it
    pub fn switch_tab(&mut self, tab: Tab) {
        self.chat_list_screen.set_tab(tab);
        self.chat_list_screen.clear_status();
        self.load_current_tab();
    }

    /// Open the chat under the cursor
    pub fn open_selected_chat(&mut self) {
        let Some(chat_id) = self.highlighted_chat().map(|c| c.chat_id) else {
            return;
        };

        self.current_screen = Screen::ChatView;
        self.chat_view_screen = Some(ChatViewScreen::new(chat_id));

        let store = self.store.clone();
        self.spawn_command("Opening chat", async move { store.select_chat(chat_id).await });
    }

    /// Flip the pin of the chat under the cursor
    pub fn toggle_pin_selected(&mut self) {
        if let Some(chat_id) = self.highlighted_chat().map(|c| c.chat_id) {
            let store = self.store.clone();
            self.spawn_command("Pinning chat", async move { store.pin_chat(chat_id).await.map(|_| ()) });
        }
    }

    /// Flip the bookmark of the chat under the cursor
    pub fn toggle_bookmark_selected(&mut self) {
        if let Some(chat_id) = self.highlighted_chat().map(|c| c.chat_id) {
            let store = self.store.clone();
            self.spawn_command("Bookmarking chat", async move {
                store.toggle_chat_bookmark(chat_id).await.map(|_| ())
            });
        }
    }

    /// Mark the chat under the cursor unread
    pub fn mark_selected_unread(&mut self) {
        if let Some(chat_id) = self.highlighted_chat().map(|c| c.chat_id) {
            let store = self.store.clone();
            self.spawn_command("Marking chat unread", async move { store.mark_chat_unread(chat_id).await });
        }
    }

    /// Refresh chat status fields in the background
    pub fn sync_status(&mut self) {
        let store = self.store.clone();
        self.spawn_command("Syncing chats", async move { store.sync_chats_status().await.map(|_| ()) });
    }

    // ========== Chat view commands ==========

    /// Leave the chat window
    pub fn back_to_chat_list(&mut self) {
        self.current_screen = Screen::ChatList;
        self.chat_view_screen = None;
    }

    /// Send the composed message
    pub fn send_message_in_chat(&mut self) {
        let Some(screen) = &mut self.chat_view_screen else {
            return;
        };
        let chat_id = screen.chat_id;
        let text = screen.take_input();
        if text.trim().is_empty() {
            return;
        }

        let store = self.store.clone();
        self.spawn_command("Sending message", async move {
            store.send_message(chat_id, &text).await;
            Ok(())
        });
    }

    /// Flip the bookmark of the highlighted message
    pub fn toggle_bookmark_highlighted(&mut self) {
        let Some(screen) = &self.chat_view_screen else {
            return;
        };
        let chat_id = screen.chat_id;
        let Some(message_id) = screen
            .highlighted
            .and_then(|i| self.snapshot.messages(chat_id).get(i))
            .map(|m| m.id.clone())
        else {
            return;
        };

        let store = self.store.clone();
        self.spawn_command("Bookmarking message", async move {
            store.toggle_message_bookmark(chat_id, &message_id).await.map(|_| ())
        });
    }

    /// Poll the open chat for new messages
    pub fn poll_open_chat(&mut self) {
        if self.current_screen != Screen::ChatView {
            return;
        }
        let store = self.store.clone();
        self.spawn_command("Polling", async move {
            store.poll_selected().await;
            Ok(())
        });
    }
}
