//! Screen state structures for TUI

use crate::store::ChatId;
use crate::tui::types::Tab;

/// Chat List screen state
#[derive(Debug, Default)]
pub struct ChatListScreen {
    /// Active inbox tab
    pub tab: Tab,
    /// Selected chat index
    pub selected_index: usize,
    /// Status message
    pub status_message: Option<String>,
}

impl ChatListScreen {
    /// Create new chat list screen
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to next chat
    pub fn next(&mut self, chat_count: usize) {
        if chat_count > 0 {
            self.selected_index = (self.selected_index + 1) % chat_count;
        }
    }

    /// Move to previous chat
    pub fn previous(&mut self, chat_count: usize) {
        if chat_count > 0 {
            if self.selected_index > 0 {
                self.selected_index -= 1;
            } else {
                self.selected_index = chat_count - 1;
            }
        }
    }

    /// Keep the selection inside a list that may have shrunk
    pub fn clamp(&mut self, chat_count: usize) {
        if self.selected_index >= chat_count {
            self.selected_index = chat_count.saturating_sub(1);
        }
    }

    /// Switch tab and reset the selection
    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.selected_index = 0;
    }

    /// Set status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

/// Chat View screen state
#[derive(Debug)]
pub struct ChatViewScreen {
    /// Chat being shown
    pub chat_id: ChatId,
    /// Input buffer for message composition
    pub input: String,
    /// Lines scrolled back from the newest message
    pub scroll_offset: usize,
    /// Highlighted message, used for bookmarking
    pub highlighted: Option<usize>,
    /// Status message
    pub status_message: Option<String>,
}

impl ChatViewScreen {
    /// Create new chat view screen
    pub fn new(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            input: String::new(),
            scroll_offset: 0,
            highlighted: None,
            status_message: None,
        }
    }

    /// Add character to input
    pub fn add_char(&mut self, c: char) {
        self.input.push(c);
    }

    /// Remove last character from input
    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Take the composed text, leaving the input empty
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    /// Scroll back towards older messages
    pub fn scroll_up(&mut self, max_offset: usize) {
        if self.scroll_offset < max_offset {
            self.scroll_offset += 1;
        }
    }

    /// Scroll forward towards the newest message
    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    /// Highlight the next older message, starting from the newest
    pub fn highlight_previous(&mut self, message_count: usize) {
        if message_count == 0 {
            self.highlighted = None;
            return;
        }
        self.highlighted = Some(match self.highlighted {
            Some(i) if i > 0 => (i - 1).min(message_count - 1),
            Some(_) => 0,
            None => message_count - 1,
        });
    }

    /// Highlight the next newer message; past the newest clears the highlight
    pub fn highlight_next(&mut self, message_count: usize) {
        self.highlighted = match self.highlighted {
            Some(i) if i + 1 < message_count => Some(i + 1),
            _ => None,
        };
    }

    /// Set status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }
}
