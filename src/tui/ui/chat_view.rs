//! Chat view screen rendering

use crate::store::{Chat, DeliveryStatus, Message};
use crate::tui::app::App;
use crate::tui::ui::helpers::{format_timestamp, sender_label};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Renders the screen
pub fn render_chat_view(f: &mut Frame, app: &App) {
    let size = f.size();

    let Some(screen) = &app.chat_view_screen else {
        return;
    };
    let chat = app.open_chat();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(5),    // Message history
            Constraint::Length(3), // Input box
            Constraint::Length(3), // Status/Help
        ])
        .split(size);

    // Title - counterpart name and headline
    let title_text = match chat {
        Some(chat) if !chat.counterpart.profile.headline.is_empty() => {
            format!("{} · {}", chat.display_name(), chat.counterpart.profile.headline)
        }
        Some(chat) => chat.display_name(),
        None => format!("Chat {}", screen.chat_id),
    };
    let title = Paragraph::new(title_text)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    // Message history
    let messages = app.open_messages();
    if messages.is_empty() {
        let empty_msg = Paragraph::new("No messages yet. Type a message below and press Enter to send.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Messages"));
        f.render_widget(empty_msg, chunks[1]);
    } else {
        let lines = message_lines(messages, chat, screen.highlighted);

        // Anchor to the newest line, minus however far the user scrolled back
        let visible_height = usize::from(chunks[1].height.saturating_sub(2));
        let end_idx = lines.len().saturating_sub(screen.scroll_offset);
        let start_idx = end_idx.saturating_sub(visible_height);
        let total = lines.len();

        let messages_widget = Paragraph::new(lines[start_idx..end_idx].to_vec())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Messages ({}/{})", end_idx, total)),
            );
        f.render_widget(messages_widget, chunks[1]);
    }

    // Input box
    let input_widget = Paragraph::new(screen.input.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Type your message"),
        );
    f.render_widget(input_widget, chunks[2]);

    // Status/Help
    let help_text = if let Some(status) = &screen.status_message {
        status.clone()
    } else {
        "Enter: Send | ↑↓: Highlight | Ctrl-S: Bookmark | PgUp/PgDn: Scroll | Esc: Back".to_string()
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}

/// One header line per run of messages from the same sender, then the messages
fn message_lines(messages: &[Message], chat: Option<&Chat>, highlighted: Option<usize>) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(messages.len() * 2);
    let mut previous_sender = None;

    for (i, message) in messages.iter().enumerate() {
        if previous_sender != Some(message.sender_id) {
            let color = if message.is_from_local_user() { Color::Green } else { Color::Blue };
            lines.push(Line::from(Span::styled(
                sender_label(message, chat),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            previous_sender = Some(message.sender_id);
        }

        let mut content_style = Style::default().fg(Color::White);
        if highlighted == Some(i) {
            content_style = content_style.bg(Color::DarkGray);
        }

        let mut spans = vec![
            Span::styled(
                format!("  [{}] ", format_timestamp(message.created_at)),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(message.content.clone(), content_style),
        ];
        if message.bookmarked {
            spans.push(Span::styled(" ★", Style::default().fg(Color::Yellow)));
        }
        if message.is_from_local_user() {
            let status_color = match message.status {
                DeliveryStatus::Sent => Color::Yellow,
                DeliveryStatus::Delivered | DeliveryStatus::Read => Color::DarkGray,
            };
            spans.push(Span::styled(
                format!("  {} {}", message.status.indicator(), message.status_text()),
                Style::default().fg(status_color),
            ));
        }

        lines.push(Line::from(spans));
    }

    lines
}
