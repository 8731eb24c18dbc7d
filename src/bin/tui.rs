//! Inbox TUI (Terminal User Interface)
//!
//! A terminal-based inbox over the simulated conversation service.

use anyhow::Context;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use inbox::service::MockChatService;
use inbox::store::{ChatStore, Settings};
use inbox::tui::{ui::ui, App, Screen};
use rand::seq::SliceRandom;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

const SETTINGS_PATH: &str = "inbox_settings.json";
const LOG_PATH: &str = "inbox.log";

/// Lines the simulated counterparts write when asked to
const SIMULATED_REPLIES: &[&str] = &[
    "Quick question when you have a minute",
    "Just saw this, thanks!",
    "Can we move our call to tomorrow?",
    "Sounds good to me",
    "I pushed the changes, take a look",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings_path = std::env::var("INBOX_SETTINGS").unwrap_or_else(|_| SETTINGS_PATH.to_string());
    let settings = Settings::load(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path))?;

    inbox::init_with_log_file(LOG_PATH, &settings.log_level).context("Failed to set up logging")?;
    tracing::info!("Starting inbox with settings from {}", settings_path);

    let service = Arc::new(MockChatService::with_fixtures(settings.simulated_latency()));
    let store = ChatStore::new(service.clone(), settings);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store);
    app.load_current_tab();

    // Run main loop
    let res = run_app(&mut terminal, &mut app, &service).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("TUI exited with error: {:?}", err);
        println!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    service: &MockChatService,
) -> io::Result<()> {
    let poll_interval = app.store.settings().poll_interval();
    let sync_interval = app.store.settings().sync_interval();
    let mut last_poll = Instant::now();
    let mut last_sync = Instant::now();

    app.refresh().await;

    loop {
        if app.process_events() {
            app.refresh().await;
        }

        terminal.draw(|f| ui(f, app))?;

        if last_poll.elapsed() >= poll_interval {
            app.poll_open_chat();
            last_poll = Instant::now();
        }
        if last_sync.elapsed() >= sync_interval {
            app.sync_status();
            last_sync = Instant::now();
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                match app.current_screen {
                    Screen::ChatList => handle_chat_list_key(app, key, service),
                    Screen::ChatView => handle_chat_view_key(app, key),
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_chat_list_key(app: &mut App, key: KeyEvent, service: &MockChatService) {
    let chat_count = app.snapshot.chats.len();

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.should_quit = true;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.chat_list_screen.next(chat_count);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.chat_list_screen.previous(chat_count);
        }
        KeyCode::Tab | KeyCode::Right => {
            let tab = app.chat_list_screen.tab.next();
            app.switch_tab(tab);
        }
        KeyCode::BackTab | KeyCode::Left => {
            let tab = app.chat_list_screen.tab.previous();
            app.switch_tab(tab);
        }
        KeyCode::Enter => {
            app.open_selected_chat();
        }
        KeyCode::Char('p') => {
            app.toggle_pin_selected();
        }
        KeyCode::Char('s') => {
            app.toggle_bookmark_selected();
        }
        KeyCode::Char('u') => {
            app.mark_selected_unread();
        }
        KeyCode::Char('m') => {
            app.load_more_chats();
        }
        KeyCode::Char('r') => {
            app.load_current_tab();
        }
        // Have the highlighted counterpart write something
        KeyCode::Char('i') => {
            if let Some(chat_id) = app.highlighted_chat().map(|c| c.chat_id) {
                let line = SIMULATED_REPLIES
                    .choose(&mut rand::thread_rng())
                    .copied()
                    .unwrap_or("Hi!");
                if service.push_incoming(chat_id, line).is_some() {
                    app.chat_list_screen
                        .set_status(format!("Simulated incoming message in chat {}", chat_id));
                }
            }
        }
        _ => {}
    }
}

fn handle_chat_view_key(app: &mut App, key: KeyEvent) {
    let message_count = app.open_messages().len();

    match key.code {
        KeyCode::Esc => {
            app.back_to_chat_list();
        }
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.toggle_bookmark_highlighted();
        }
        KeyCode::Char(c) if !c.is_control() => {
            if let Some(screen) = &mut app.chat_view_screen {
                screen.add_char(c);
            }
        }
        KeyCode::Backspace => {
            if let Some(screen) = &mut app.chat_view_screen {
                screen.backspace();
            }
        }
        KeyCode::Enter => {
            app.send_message_in_chat();
        }
        KeyCode::Up => {
            if let Some(screen) = &mut app.chat_view_screen {
                screen.highlight_previous(message_count);
            }
        }
        KeyCode::Down => {
            if let Some(screen) = &mut app.chat_view_screen {
                screen.highlight_next(message_count);
            }
        }
        KeyCode::PageUp => {
            if let Some(screen) = &mut app.chat_view_screen {
                screen.scroll_up(message_count * 2);
            }
        }
        KeyCode::PageDown => {
            if let Some(screen) = &mut app.chat_view_screen {
                screen.scroll_down();
            }
        }
        _ => {}
    }
}
