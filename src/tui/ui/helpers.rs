//! UI helper functions

use crate::store::{Chat, Message};
use chrono::{DateTime, Local, Utc};

/// Format a message time for display in local time
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    let local = timestamp.with_timezone(&Local);
    if local.date_naive() == Local::now().date_naive() {
        local.format("%H:%M").to_string()
    } else {
        local.format("%b %d %H:%M").to_string()
    }
}

/// Shorten text to `max_chars`, marking the cut with an ellipsis
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max_chars {
        return single_line;
    }
    let kept: String = single_line.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}

/// Unread badge shown next to a chat, empty when there is nothing to show
pub fn unread_badge(chat: &Chat) -> String {
    match (chat.read, chat.unread_count) {
        (true, _) => String::new(),
        (false, 0) => "●".to_string(),
        (false, n) if n > 99 => "(99+)".to_string(),
        (false, n) => format!("({})", n),
    }
}

/// Sender label of a message inside a chat window
pub fn sender_label(message: &Message, chat: Option<&Chat>) -> String {
    crate::store::bookmark::sender_name(message, chat)
}
