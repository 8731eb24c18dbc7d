//! In-memory simulated conversation service
//!
//! Behaves like the real backend from the store's point of view: every call
//! waits for the configured latency and can be made to fail. The backend
//! keeps its own copy of chats and threads, so read-state changes and
//! delivered messages show up in later listings and polls.

use crate::service::{ChatFilter, ChatPage, ChatService, MessageCursor, MessagePage, NextCursor, PageRequest};
use crate::store::{Chat, ChatId, Counterpart, LastMessage, Message, MessageId, UserId, UserProfile};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Midnight UTC on the day the fixture conversations take place
const FIXTURE_DAY_EPOCH_SECS: i64 = 1_716_940_800;

/// Sender, content and time of day of a fixture message
type FixtureLine<'a> = (UserId, &'a str, (i64, i64, i64));

/// Data held by the simulated backend
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    /// Chats in listing order
    pub chats: Vec<Chat>,
    /// Full thread per chat
    pub messages: HashMap<ChatId, Vec<Message>>,
    next_message_seq: u64,
}

impl MockBackend {
    /// Empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend seeded with three demo conversations
    pub fn with_fixtures() -> Self {
        let mut backend = Self::new();

        backend.add_chat(
            10000,
            counterpart(-100, "Maya", "Fernandes", "Product Designer"),
            true,
            2,
            (-100, "Sent you the revised mockups, have a look when you can", (4, 14, 45)),
            vec![
                (LOCAL_SENDER, "Thanks, opening them now", (4, 15, 30)),
                (-100, "The onboarding flow changed the most", (4, 16, 15)),
                (LOCAL_SENDER, "Looks cleaner. I'll leave comments on the second screen.", (4, 17, 0)),
            ],
        );
        backend.add_chat(
            10001,
            counterpart(-101, "Tomas", "Berg", "Backend Engineer"),
            false,
            1,
            (-101, "Can we go over the migration plan today?", (5, 30, 0)),
            vec![
                (LOCAL_SENDER, "Sure, what worries you most?", (5, 31, 0)),
                (-101, "Mostly the backfill job on the large tables", (5, 32, 0)),
            ],
        );
        backend.add_chat(
            10002,
            counterpart(-102, "Aisha", "Okafor", "Engineering Manager"),
            true,
            3,
            (-102, "Nice demo this morning!", (6, 45, 0)),
            vec![
                (LOCAL_SENDER, "Thanks! Your feedback last week helped a lot.", (6, 46, 0)),
                (-102, "Glad to hear it. Keep it up.", (6, 47, 0)),
            ],
        );

        backend
    }

    fn add_chat(
        &mut self,
        chat_id: ChatId,
        counterpart: Counterpart,
        bookmark: bool,
        unread_count: u32,
        opening: FixtureLine<'_>,
        replies: Vec<FixtureLine<'_>>,
    ) {
        let messages: Vec<Message> = std::iter::once(opening)
            .chain(replies)
            .map(|(sender, content, (h, m, s))| {
                self.next_message_seq += 1;
                Message::new(
                    format!("msg_{}", self.next_message_seq),
                    content,
                    fixture_time(h, m, s),
                    sender,
                )
            })
            .collect();

        // Listing summaries point at the opening message, as the service reports them
        let last_message = LastMessage::from(&messages[0]);

        let mut chat = Chat::new(chat_id, counterpart, last_message);
        chat.read = unread_count == 0;
        chat.bookmark = bookmark;
        chat.unread_count = unread_count;

        self.chats.push(chat);
        self.messages.insert(chat_id, messages);
    }

    /// Add a message from the counterpart, as if they just wrote it
    ///
    /// Returns `None` if the chat does not exist.
    pub fn push_incoming(&mut self, chat_id: ChatId, content: &str) -> Option<Message> {
        let sender_id = self.chats.iter().find(|c| c.chat_id == chat_id)?.counterpart.user_id;

        self.next_message_seq += 1;
        let message = Message::new(format!("msg_{}", self.next_message_seq), content, Utc::now(), sender_id);

        self.messages.entry(chat_id).or_default().push(message.clone());
        if let Some(chat) = self.chats.iter_mut().find(|c| c.chat_id == chat_id) {
            chat.set_last_message(&message);
            chat.add_unread(1);
        }

        Some(message)
    }

    fn thread(&self, chat_id: ChatId) -> &[Message] {
        self.messages.get(&chat_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Index right after `id`; an unknown id starts from the beginning
    fn start_after(thread: &[Message], id: Option<&MessageId>) -> usize {
        id.and_then(|id| thread.iter().position(|m| &m.id == id))
            .map(|i| i + 1)
            .unwrap_or(0)
    }
}

const LOCAL_SENDER: UserId = crate::store::LOCAL_USER_ID;

fn fixture_time(hours: i64, minutes: i64, seconds: i64) -> DateTime<Utc> {
    let secs = FIXTURE_DAY_EPOCH_SECS + hours * 3600 + minutes * 60 + seconds;
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

fn counterpart(user_id: UserId, first_name: &str, last_name: &str, headline: &str) -> Counterpart {
    Counterpart {
        user_id,
        profile: UserProfile {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            profile_picture: String::new(),
            headline: headline.to_string(),
        },
    }
}

/// Simulated conversation service
///
/// # Example
/// ```rust,no_run
/// use inbox::service::{ChatFilter, ChatService, MockChatService, PageRequest};
/// use std::time::Duration;
///
/// # async fn example() -> inbox::Result<()> {
/// let service = MockChatService::with_fixtures(Duration::from_millis(300));
/// let page = service.list_chats(ChatFilter::unread(), PageRequest::first(20)).await?;
/// println!("{} unread chats", page.chats.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MockChatService {
    backend: Mutex<MockBackend>,
    latency: Duration,
    offline: AtomicBool,
    failures_remaining: AtomicU32,
    calls: AtomicU32,
}

impl MockChatService {
    /// Service over an explicit backend
    pub fn new(backend: MockBackend, latency: Duration) -> Self {
        Self {
            backend: Mutex::new(backend),
            latency,
            offline: AtomicBool::new(false),
            failures_remaining: AtomicU32::new(0),
            calls: AtomicU32::new(0),
        }
    }

    /// Service seeded with the demo conversations
    pub fn with_fixtures(latency: Duration) -> Self {
        Self::new(MockBackend::with_fixtures(), latency)
    }

    /// Fixture service that answers without delay
    pub fn instant() -> Self {
        Self::with_fixtures(Duration::ZERO)
    }

    /// Make every call fail until switched back
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make the next `count` calls fail
    pub fn fail_next(&self, count: u32) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Simulate the counterpart writing a message
    pub fn push_incoming(&self, chat_id: ChatId, content: &str) -> Option<Message> {
        self.with_backend(|backend| backend.push_incoming(chat_id, content))
    }

    /// Run `f` against the backend data
    pub fn with_backend<T>(&self, f: impl FnOnce(&mut MockBackend) -> T) -> T {
        let mut backend = match self.backend.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut *backend)
    }

    async fn round_trip(&self, operation: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Service(format!("{}: service unreachable", operation)));
        }

        let injected = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(Error::Service(format!("{}: transient failure", operation)));
        }

        Ok(())
    }
}

impl Default for MockChatService {
    fn default() -> Self {
        Self::with_fixtures(Duration::from_millis(300))
    }
}

#[async_trait]
impl ChatService for MockChatService {
    async fn list_chats(&self, filter: ChatFilter, page: PageRequest) -> Result<ChatPage> {
        self.round_trip("list_chats").await?;

        Ok(self.with_backend(|backend| {
            let filtered: Vec<&Chat> = backend.chats.iter().filter(|c| filter.matches(c)).collect();
            let start = (page.offset as usize).min(filtered.len());
            let end = (start + page.page_size as usize).min(filtered.len());

            ChatPage {
                chats: filtered[start..end].iter().map(|c| (*c).clone()).collect(),
                has_more: end < filtered.len(),
            }
        }))
    }

    async fn list_messages(&self, chat_id: ChatId, cursor: MessageCursor) -> Result<MessagePage> {
        self.round_trip("list_messages").await?;

        Ok(self.with_backend(|backend| {
            let thread = backend.thread(chat_id);
            let start = MockBackend::start_after(thread, cursor.last_message_id.as_ref());
            let end = (start + cursor.page_size as usize).min(thread.len());
            let messages = thread[start..end].to_vec();

            MessagePage {
                cursor: NextCursor {
                    last_message_id: messages.last().map(|m| m.id.clone()),
                    page_size: cursor.page_size,
                    has_next_message: end < thread.len(),
                },
                messages,
            }
        }))
    }

    async fn set_read_state(&self, chat_id: ChatId, read: bool) -> Result<()> {
        self.round_trip("set_read_state").await?;

        self.with_backend(|backend| {
            if let Some(chat) = backend.chats.iter_mut().find(|c| c.chat_id == chat_id) {
                chat.read = unread_count == 0;
                if read {
                    chat.unread_count = 0;
                }
            }
        });
        Ok(())
    }

    async fn poll_messages(&self, chat_id: ChatId, last_message_id: &MessageId) -> Result<Vec<Message>> {
        self.round_trip("poll_messages").await?;

        Ok(self.with_backend(|backend| {
            let thread = backend.thread(chat_id);
            let start = MockBackend::start_after(thread, Some(last_message_id));
            thread[start..].to_vec()
        }))
    }

    async fn deliver_message(&self, chat_id: ChatId, message: &Message) -> Result<()> {
        self.round_trip("deliver_message").await?;

        self.with_backend(|backend| {
            let mut delivered = message.clone();
            delivered.mark_delivered();
            delivered.bookmarked = false;

            if let Some(chat) = backend.chats.iter_mut().find(|c| c.chat_id == chat_id) {
                chat.set_last_message(&delivered);
            }
            backend.messages.entry(chat_id).or_default().push(delivered);
        });
        Ok(())
    }
}
