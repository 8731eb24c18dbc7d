//! Chat list screen rendering

use crate::store::Chat;
use crate::tui::app::App;
use crate::tui::types::Tab;
use crate::tui::ui::bookmarks::render_bookmarks;
use crate::tui::ui::helpers::{format_timestamp, truncate_preview, unread_badge};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs},
    Frame,
};

const PREVIEW_CHARS: usize = 48;

/// Renders the inbox: tab bar, chats and, on the Bookmarks tab, bookmarked messages
pub fn render_chat_list(f: &mut Frame, app: &App) {
    let size = f.size();
    let screen = &app.chat_list_screen;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(5),    // Chat list
            Constraint::Length(3), // Status message
            Constraint::Length(3), // Help text
        ])
        .split(size);

    // Tabs
    let titles: Vec<String> = Tab::all()
        .iter()
        .map(|tab| tab.label().to_string())
        .collect();
    let tabs = Tabs::new(titles)
        .select(screen.tab.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Inbox ({} chats)", app.snapshot.chats.len())),
        );
    f.render_widget(tabs, chunks[0]);

    if screen.tab == Tab::Bookmarks {
        let halves = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        render_chats(f, app, halves[0]);
        render_bookmarks(f, app, halves[1]);
    } else {
        render_chats(f, app, chunks[1]);
    }

    // Status message
    let status_text = screen.status_message.as_deref().unwrap_or("");
    let status_widget = Paragraph::new(status_text)
        .style(Style::default().fg(Color::Green))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status_widget, chunks[2]);

    // Help text
    let help_text =
        "↑↓/j/k: Navigate | Tab: Switch tab | Enter: Open | p: Pin | s: Bookmark | u: Unread | m: More | q: Quit";
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}

fn render_chats(f: &mut Frame, app: &App, area: Rect) {
    if app.snapshot.chats.is_empty() {
        let empty_msg = Paragraph::new("No conversations here yet.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Chats"));
        f.render_widget(empty_msg, area);
        return;
    }

    let items: Vec<ListItem> = app
        .snapshot
        .chats
        .iter()
        .enumerate()
        .map(|(i, chat)| chat_item(chat, i == app.chat_list_screen.selected_index))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Chats (📌 Pinned | ★ Bookmarked | (n) Unread)"),
    );
    f.render_widget(list, area);
}

fn chat_item(chat: &Chat, selected: bool) -> ListItem<'static> {
    let name_style = if chat.read {
        Style::default().fg(Color::White)
    } else {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    };

    let cursor = if selected {
        Span::styled("→ ", Style::default().fg(Color::Cyan))
    } else {
        Span::raw("  ")
    };
    let pin = if chat.pinned { "📌 " } else { "   " };
    let bookmark = if chat.bookmark { "★ " } else { "  " };

    let header = Line::from(vec![
        cursor,
        Span::raw(pin),
        Span::styled(bookmark, Style::default().fg(Color::Yellow)),
        Span::styled(chat.display_name(), name_style),
        Span::raw(" "),
        Span::styled(unread_badge(chat), Style::default().fg(Color::Green)),
        Span::styled(
            format!("  {}", format_timestamp(chat.last_message.created_at)),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let preview = Line::from(vec![
        Span::raw("       "),
        Span::styled(
            truncate_preview(&chat.last_message.content, PREVIEW_CHARS),
            Style::default().fg(Color::Gray),
        ),
    ]);

    ListItem::new(vec![header, preview])
}
