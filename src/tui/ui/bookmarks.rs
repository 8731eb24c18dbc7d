//! Bookmarked messages panel

use crate::tui::app::App;
use crate::tui::ui::helpers::{format_timestamp, truncate_preview};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Renders the bookmarked-message collection into `area`
pub fn render_bookmarks(f: &mut Frame, app: &App, area: Rect) {
    let bookmarks = &app.snapshot.bookmarked_messages;
    let title = format!("Bookmarked messages ({})", bookmarks.len());

    if bookmarks.is_empty() {
        let empty_msg = Paragraph::new("No bookmarked messages. Press 's' on a message to keep it here.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(empty_msg, area);
        return;
    }

    let width = usize::from(area.width.saturating_sub(30));
    let items: Vec<ListItem> = bookmarks
        .iter()
        .map(|bookmark| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("[{}] ", format_timestamp(bookmark.created_at)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{}: ", bookmark.sender_name),
                    Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                ),
                Span::raw(truncate_preview(&bookmark.content, width.max(10))),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}
