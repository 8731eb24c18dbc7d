//! UI rendering module - screen-specific rendering functions
//!
//! This module contains the UI rendering logic organized by screen type.

mod bookmarks;
mod chat_list;
mod chat_view;
mod helpers;

use crate::tui::app::App;
use crate::tui::types::Screen;
use ratatui::Frame;

// Re-export render functions
pub use bookmarks::render_bookmarks;
pub use chat_list::render_chat_list;
pub use chat_view::render_chat_view;

// Re-export helper functions
pub use helpers::{format_timestamp, sender_label, truncate_preview, unread_badge};

/// Main UI rendering function - dispatches to screen-specific render functions
pub fn ui(f: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::ChatList => render_chat_list(f, app),
        Screen::ChatView => render_chat_view(f, app),
    }
}
