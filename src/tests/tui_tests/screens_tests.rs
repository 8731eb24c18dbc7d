// Screen Tests - Testing screen structs and their methods

use crate::tui::screens::*;
use crate::tui::Tab;

// ChatListScreen Tests

#[test]
fn test_chat_list_navigation_wraps() {
    let mut screen = ChatListScreen::new();
    assert_eq!(screen.selected_index, 0);

    screen.next(3);
    screen.next(3);
    assert_eq!(screen.selected_index, 2);
    screen.next(3);
    assert_eq!(screen.selected_index, 0, "Should wrap to beginning");

    screen.previous(3);
    assert_eq!(screen.selected_index, 2, "Should wrap to end");
}

#[test]
fn test_chat_list_navigation_empty() {
    let mut screen = ChatListScreen::new();
    screen.next(0);
    screen.previous(0);
    assert_eq!(screen.selected_index, 0);
}

#[test]
fn test_chat_list_clamp() {
    let mut screen = ChatListScreen::new();
    screen.selected_index = 5;

    screen.clamp(2);
    assert_eq!(screen.selected_index, 1);

    screen.clamp(0);
    assert_eq!(screen.selected_index, 0);
}

#[test]
fn test_chat_list_set_tab_resets_selection() {
    let mut screen = ChatListScreen::new();
    screen.selected_index = 2;

    screen.set_tab(Tab::Unread);

    assert_eq!(screen.tab, Tab::Unread);
    assert_eq!(screen.selected_index, 0);
}

#[test]
fn test_chat_list_status() {
    let mut screen = ChatListScreen::new();
    screen.set_status("Loaded".to_string());
    assert_eq!(screen.status_message.as_deref(), Some("Loaded"));
    screen.clear_status();
    assert!(screen.status_message.is_none());
}

// ChatViewScreen Tests

#[test]
fn test_chat_view_input() {
    let mut screen = ChatViewScreen::new(10000);
    for c in "hey!".chars() {
        screen.add_char(c);
    }
    screen.backspace();
    assert_eq!(screen.input, "hey");

    assert_eq!(screen.take_input(), "hey");
    assert!(screen.input.is_empty());
}

#[test]
fn test_chat_view_scroll_bounds() {
    let mut screen = ChatViewScreen::new(10000);

    screen.scroll_down();
    assert_eq!(screen.scroll_offset, 0);

    screen.scroll_up(2);
    screen.scroll_up(2);
    screen.scroll_up(2);
    assert_eq!(screen.scroll_offset, 2);

    screen.scroll_down();
    assert_eq!(screen.scroll_offset, 1);
}

#[test]
fn test_chat_view_highlight() {
    let mut screen = ChatViewScreen::new(10000);

    screen.highlight_previous(3);
    assert_eq!(screen.highlighted, Some(2), "Starts from the newest message");
    screen.highlight_previous(3);
    screen.highlight_previous(3);
    screen.highlight_previous(3);
    assert_eq!(screen.highlighted, Some(0));

    screen.highlight_next(3);
    assert_eq!(screen.highlighted, Some(1));
    screen.highlight_next(3);
    screen.highlight_next(3);
    assert_eq!(screen.highlighted, None, "Moving past the newest clears the highlight");

    screen.highlight_previous(0);
    assert_eq!(screen.highlighted, None);
}
