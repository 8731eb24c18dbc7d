// State Tests - Testing StoreState reconciliation rules and the invariant checker

use crate::service::{ChatFilter, ChatPage, MessagePage, NextCursor, PageRequest};
use crate::store::{ChatOrdering, DeliveryStatus, Message, MessageId, Reconciled, StoreState, LOCAL_USER_ID};
use crate::tests::support::{chat_ids, counterpart_id, make_chat, make_message};
use chrono::{Duration, Utc};

fn page(chats: Vec<crate::store::Chat>, has_more: bool) -> ChatPage {
    ChatPage { chats, has_more }
}

fn message_page(messages: Vec<Message>) -> MessagePage {
    MessagePage {
        cursor: NextCursor {
            last_message_id: messages.last().map(|m| m.id.clone()),
            page_size: 20,
            has_next_message: false,
        },
        messages,
    }
}

fn state_with_chats(ids_and_minutes: &[(i64, i64)]) -> StoreState {
    let mut state = StoreState::new(ChatOrdering::PinnedFirst);
    let chats = ids_and_minutes.iter().map(|&(id, at)| make_chat(id, at)).collect();
    let ticket = state.begin_chat_listing(ChatFilter::all(), PageRequest::first(20));
    state.apply_chat_page(ticket, page(chats, false));
    state
}

fn state_with_thread(chat_id: i64, message_ids: &[&str]) -> StoreState {
    let mut state = state_with_chats(&[(chat_id, 0)]);
    let messages = message_ids
        .iter()
        .enumerate()
        .map(|(i, id)| make_message(id, counterpart_id(chat_id), i as i64))
        .collect();
    let token = state.begin_message_load(chat_id);
    assert!(state.apply_message_page(chat_id, token, message_page(messages)));
    state
}

// ========== Chat listing ==========

#[test]
fn test_fresh_page_replaces_working_set() {
    let mut state = state_with_chats(&[(1, 0), (2, 1)]);

    let ticket = state.begin_chat_listing(ChatFilter::unread(), PageRequest::first(20));
    let outcome = state.apply_chat_page(ticket, page(vec![make_chat(3, 5)], true));

    assert_eq!(outcome, Reconciled::Applied { has_more: true });
    assert_eq!(chat_ids(state.chats()), vec![3]);
    assert_eq!(state.active_filter(), ChatFilter::unread());
}

#[test]
fn test_fresh_page_sorted_canonically() {
    let state = state_with_chats(&[(1, 0), (2, 20), (3, 10)]);
    assert_eq!(chat_ids(state.chats()), vec![2, 3, 1]);
}

#[test]
fn test_later_page_accumulates_and_dedupes() {
    let mut state = state_with_chats(&[(1, 0), (2, 10)]);

    let mut updated = make_chat(2, 30);
    updated.bookmark = true;
    let ticket = state.begin_chat_listing(ChatFilter::all(), PageRequest { page_size: 20, offset: 2 });
    let outcome = state.apply_chat_page(ticket, page(vec![updated, make_chat(5, 5), make_chat(5, 6)], false));

    assert_eq!(outcome, Reconciled::Applied { has_more: false });
    assert_eq!(chat_ids(state.chats()), vec![2, 5, 1]);
    // Server fields win for content
    let chat = state.chat(2).expect("chat 2");
    assert!(chat.bookmark);
    assert_eq!(chat.last_message.created_at, make_chat(2, 30).last_message.created_at);
    tokio_test::assert_ok!(state.verify_invariants());
}

#[test]
fn test_duplicates_within_fresh_page_collapse() {
    let mut state = StoreState::new(ChatOrdering::PinnedFirst);
    let ticket = state.begin_chat_listing(ChatFilter::all(), PageRequest::first(20));
    state.apply_chat_page(ticket, page(vec![make_chat(1, 0), make_chat(2, 1), make_chat(1, 2)], false));

    assert_eq!(state.chats().len(), 2);
    tokio_test::assert_ok!(state.verify_invariants());
}

#[test]
fn test_pin_survives_fresh_load() {
    let mut state = state_with_chats(&[(1, 0), (2, 10)]);
    assert_eq!(state.toggle_pin(1), Some(true));

    let ticket = state.begin_chat_listing(ChatFilter::all(), PageRequest::first(20));
    state.apply_chat_page(ticket, page(vec![make_chat(1, 0), make_chat(2, 10)], false));

    assert!(state.chat(1).expect("chat 1").pinned);
    assert_eq!(chat_ids(state.chats()), vec![1, 2]);
}

#[test]
fn test_read_chat_from_server_has_no_unread() {
    let mut chat = make_chat(1, 0);
    chat.read = true;
    chat.unread_count = 4;

    let mut state = StoreState::new(ChatOrdering::PinnedFirst);
    let ticket = state.begin_chat_listing(ChatFilter::all(), PageRequest::first(20));
    state.apply_chat_page(ticket, page(vec![chat], false));

    assert_eq!(state.chat(1).expect("chat 1").unread_count, 0);
}

#[test]
fn test_stale_fresh_listing_is_superseded() {
    let mut state = StoreState::new(ChatOrdering::PinnedFirst);

    let older = state.begin_chat_listing(ChatFilter::unread(), PageRequest::first(20));
    let newer = state.begin_chat_listing(ChatFilter::all(), PageRequest::first(20));

    state.apply_chat_page(newer, page(vec![make_chat(1, 0), make_chat(2, 1)], false));
    let outcome = state.apply_chat_page(older, page(vec![make_chat(9, 0)], false));

    assert_eq!(outcome, Reconciled::Superseded);
    assert_eq!(chat_ids(state.chats()), vec![2, 1]);
    assert_eq!(state.active_filter(), ChatFilter::all());
}

#[test]
fn test_out_of_order_same_filter_older_response_dropped() {
    let mut state = StoreState::new(ChatOrdering::PinnedFirst);

    let first = state.begin_chat_listing(ChatFilter::all(), PageRequest::first(20));
    let second = state.begin_chat_listing(ChatFilter::all(), PageRequest::first(20));

    assert_eq!(
        state.apply_chat_page(second, page(vec![make_chat(1, 0)], false)),
        Reconciled::Applied { has_more: false }
    );
    assert_eq!(
        state.apply_chat_page(first, page(vec![make_chat(2, 0)], false)),
        Reconciled::Superseded
    );
    assert_eq!(chat_ids(state.chats()), vec![1]);
}

#[test]
fn test_next_page_for_inactive_filter_dropped() {
    let mut state = state_with_chats(&[(1, 0)]);

    let ticket = state.begin_chat_listing(ChatFilter::bookmarked(), PageRequest { page_size: 20, offset: 20 });
    let outcome = state.apply_chat_page(ticket, page(vec![make_chat(7, 0)], false));

    assert_eq!(outcome, Reconciled::Superseded);
    assert_eq!(chat_ids(state.chats()), vec![1]);
}

#[test]
fn test_merge_chat_status_keeps_order_and_pins() {
    let mut state = state_with_chats(&[(1, 0), (2, 10), (3, 20)]);
    state.toggle_pin(1);
    let before = chat_ids(state.chats());

    let mut server_two = make_chat(2, 90);
    server_two.read = false;
    server_two.unread_count = 3;
    let refreshed = state.merge_chat_status(&[server_two, make_chat(42, 0)]);

    assert_eq!(refreshed, 1);
    assert_eq!(chat_ids(state.chats()), before);
    let chat = state.chat(2).expect("chat 2");
    assert_eq!(chat.unread_count, 3);
    assert!(!chat.read);
    assert!(state.chat(1).expect("chat 1").pinned);
    assert!(state.chat(42).is_none());
}

// ========== Selection and read state ==========

#[test]
fn test_select_chat_returns_previous() {
    let mut state = state_with_chats(&[(1, 0), (2, 1)]);
    assert_eq!(state.select_chat(1), None);
    assert_eq!(state.select_chat(2), Some(1));
    assert_eq!(state.selected_chat_id(), Some(2));
}

#[test]
fn test_apply_read_state_unknown_chat() {
    let mut state = state_with_chats(&[(1, 0)]);
    assert!(!state.apply_read_state(99, true));
}

// ========== Message threads ==========

#[test]
fn test_message_page_replaces_thread() {
    let mut state = state_with_thread(1, &["a", "b"]);

    let token = state.begin_message_load(1);
    state.apply_message_page(1, token, message_page(vec![make_message("c", 101, 5)]));

    let ids: Vec<&str> = state.messages(1).iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["c"]);
}

#[test]
fn test_stale_message_page_dropped() {
    let mut state = state_with_chats(&[(1, 0)]);

    let older = state.begin_message_load(1);
    let newer = state.begin_message_load(1);

    assert!(state.apply_message_page(1, newer, message_page(vec![make_message("new", 101, 1)])));
    assert!(!state.apply_message_page(1, older, message_page(vec![make_message("old", 101, 0)])));
    assert_eq!(state.messages(1)[0].id.as_str(), "new");
}

#[test]
fn test_message_tokens_are_per_chat() {
    let mut state = state_with_chats(&[(1, 0), (2, 0)]);

    let one = state.begin_message_load(1);
    let two = state.begin_message_load(2);

    assert!(state.apply_message_page(2, two, message_page(vec![make_message("b", 102, 0)])));
    assert!(state.apply_message_page(1, one, message_page(vec![make_message("a", 101, 0)])));
}

#[test]
fn test_message_page_keeps_unconfirmed_local_messages() {
    let mut state = state_with_thread(1, &["a"]);
    let local = Message::new_local("still sending");
    let local_id = local.id.clone();
    state.append_local_message(1, local);

    let token = state.begin_message_load(1);
    state.apply_message_page(1, token, message_page(vec![make_message("a", 101, 0), make_message("b", 101, 1)]));

    let ids: Vec<MessageId> = state.messages(1).iter().map(|m| m.id.clone()).collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[2], local_id);
}

#[test]
fn test_message_page_reapplies_bookmarks() {
    let mut state = state_with_thread(1, &["a", "b"]);
    state.toggle_message_bookmark(1, &MessageId::from("b"));

    let token = state.begin_message_load(1);
    state.apply_message_page(1, token, message_page(vec![make_message("a", 101, 0), make_message("b", 101, 1)]));

    assert!(!state.messages(1)[0].bookmarked);
    assert!(state.messages(1)[1].bookmarked);
    tokio_test::assert_ok!(state.verify_invariants());
}

#[test]
fn test_append_local_message_promotes_and_clears_unread() {
    let mut state = state_with_chats(&[(1, 0), (2, 10)]);
    state.merge_chat_status(&[{
        let mut c = make_chat(1, 0);
        c.read = false;
        c.unread_count = 5;
        c
    }]);

    let message = Message::new_local("hello");
    state.append_local_message(1, message.clone());

    let chat = state.chat(1).expect("chat 1");
    assert_eq!(chat.unread_count, 0);
    assert_eq!(chat.last_message.id, message.id);
    assert_eq!(chat.last_message.status, DeliveryStatus::Sent);
    assert_eq!(state.chats()[0].chat_id, 1);
    assert_eq!(state.messages(1).len(), 1);
}

#[test]
fn test_confirm_delivery_updates_message_and_summary() {
    let mut state = state_with_chats(&[(1, 0)]);
    let message = Message::new_local("hello");
    let id = message.id.clone();
    state.append_local_message(1, message);

    assert!(state.confirm_delivery(1, &id));

    assert_eq!(state.messages(1)[0].status, DeliveryStatus::Delivered);
    assert_eq!(state.messages(1)[0].id, id);
    assert_eq!(state.chat(1).expect("chat 1").last_message.status, DeliveryStatus::Delivered);
}

#[test]
fn test_confirm_delivery_of_missing_message() {
    let mut state = state_with_chats(&[(1, 0)]);
    assert!(!state.confirm_delivery(1, &MessageId::from("local_gone")));
}

#[test]
fn test_confirm_delivery_leaves_newer_summary() {
    let mut state = state_with_chats(&[(1, 0)]);
    let first = Message::new_local("one");
    let first_id = first.id.clone();
    state.append_local_message(1, first);
    let second = Message::new_local("two");
    let second_id = second.id.clone();
    state.append_local_message(1, second);

    state.confirm_delivery(1, &first_id);

    let chat = state.chat(1).expect("chat 1");
    assert_eq!(chat.last_message.id, second_id);
    assert_eq!(chat.last_message.status, DeliveryStatus::Sent);
}

#[test]
fn test_polled_messages_on_unselected_chat_add_unread() {
    let mut state = state_with_thread(1, &["a"]);
    state.merge_chat_status(&[{
        let mut c = make_chat(1, 0);
        c.read = false;
        c.unread_count = 1;
        c
    }]);

    let appended = state.apply_polled_messages(1, vec![make_message("b", 101, 5), make_message("c", 101, 6)]);

    assert_eq!(appended, 2);
    let chat = state.chat(1).expect("chat 1");
    assert_eq!(chat.unread_count, 3);
    assert!(!chat.read);
    assert_eq!(chat.last_message.id.as_str(), "c");
}

#[test]
fn test_polled_messages_on_selected_chat_stay_read() {
    let mut state = state_with_thread(1, &["a"]);
    state.select_chat(1);

    state.apply_polled_messages(1, vec![make_message("b", 101, 5)]);

    let chat = state.chat(1).expect("chat 1");
    assert!(chat.read);
    assert_eq!(chat.unread_count, 0);
}

#[test]
fn test_polled_duplicates_skipped() {
    let mut state = state_with_thread(1, &["a", "b"]);

    let appended = state.apply_polled_messages(
        1,
        vec![make_message("b", 101, 1), make_message("c", 101, 2), make_message("c", 101, 2)],
    );

    assert_eq!(appended, 1);
    assert_eq!(state.messages(1).len(), 3);
    tokio_test::assert_ok!(state.verify_invariants());
}

#[test]
fn test_empty_poll_changes_nothing() {
    let mut state = state_with_chats(&[(1, 0), (2, 10)]);
    let before = state.snapshot();

    assert_eq!(state.apply_polled_messages(1, Vec::new()), 0);
    assert_eq!(state.snapshot(), before);
}

#[test]
fn test_poll_promotes_chat() {
    let mut state = state_with_chats(&[(1, 0), (2, 10), (3, 20)]);
    state.apply_polled_messages(1, vec![make_message("x", 101, 1)]);
    assert_eq!(state.chats()[0].chat_id, 1);
}

#[test]
fn test_last_message_id_prefers_thread() {
    let mut state = state_with_chats(&[(1, 0)]);
    assert_eq!(state.last_message_id(1), Some(MessageId::from("last_1")));

    let token = state.begin_message_load(1);
    state.apply_message_page(1, token, message_page(vec![make_message("a", 101, 0)]));
    assert_eq!(state.last_message_id(1), Some(MessageId::from("a")));

    assert_eq!(state.last_message_id(99), None);
}

#[test]
fn test_last_message_id_skips_local_messages() {
    let mut state = state_with_thread(1, &["a", "b"]);

    state.append_local_message(1, Message::new_local("on my way"));

    assert_eq!(state.last_message_id(1), Some(MessageId::from("b")));
}

#[test]
fn test_last_message_id_ignores_local_summary() {
    let mut state = state_with_chats(&[(1, 0)]);

    state.append_local_message(1, Message::new_local("first words"));

    assert!(state.chat(1).expect("chat 1").last_message.id.is_local());
    assert_eq!(state.last_message_id(1), None);
}

#[test]
fn test_polled_message_lands_before_later_local_message() {
    let mut state = state_with_thread(1, &["a"]);
    state.append_local_message(1, Message::new_local("reply"));

    let appended = state.apply_polled_messages(1, vec![make_message("b", 101, 5)]);

    assert_eq!(appended, 1);
    let ids: Vec<&str> = state.messages(1).iter().map(|m| m.id.as_str()).collect();
    assert_eq!(&ids[..2], &["a", "b"]);
    assert!(state.messages(1)[2].id.is_local());
    assert!(state.chat(1).expect("chat 1").last_message.id.is_local());
    tokio_test::assert_ok!(state.verify_invariants());
}

#[test]
fn test_polled_message_newer_than_local_is_appended() {
    let mut state = state_with_thread(1, &["a"]);
    state.append_local_message(1, Message::new_local("reply"));
    let later = Message::new("c", "later", Utc::now() + Duration::hours(1), 101);

    state.apply_polled_messages(1, vec![later]);

    let thread = state.messages(1);
    assert!(thread[1].id.is_local());
    assert_eq!(thread[2].id.as_str(), "c");
    assert_eq!(state.chat(1).expect("chat 1").last_message.id.as_str(), "c");
    tokio_test::assert_ok!(state.verify_invariants());
}

#[test]
fn test_grouped_messages_by_consecutive_sender() {
    let mut state = state_with_chats(&[(1, 0)]);
    let token = state.begin_message_load(1);
    state.apply_message_page(
        1,
        token,
        message_page(vec![
            make_message("a", 101, 0),
            make_message("b", 101, 1),
            make_message("c", LOCAL_USER_ID, 2),
            make_message("d", 101, 3),
        ]),
    );

    let groups = state.grouped_messages(1);

    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].sender_id, 101);
    assert_eq!(groups[0].messages.len(), 2);
    assert_eq!(groups[1].sender_id, LOCAL_USER_ID);
    assert_eq!(groups[2].messages[0].id.as_str(), "d");
    assert!(state.grouped_messages(99).is_empty());
}

// ========== Pins and bookmarks ==========

#[test]
fn test_toggle_pin_is_self_inverse() {
    let mut state = state_with_chats(&[(1, 0), (2, 10), (3, 20), (4, 30)]);
    let before = state.chats().to_vec();

    assert_eq!(state.toggle_pin(2), Some(true));
    assert_eq!(state.chats()[0].chat_id, 2);
    assert_eq!(state.toggle_pin(2), Some(false));

    assert_eq!(state.chats(), before.as_slice());
}

#[test]
fn test_toggle_pin_unknown_chat() {
    let mut state = state_with_chats(&[(1, 0)]);
    assert_eq!(state.toggle_pin(9), None);
}

#[test]
fn test_toggle_chat_bookmark_keeps_order() {
    let mut state = state_with_chats(&[(1, 0), (2, 10)]);
    let before = chat_ids(state.chats());

    assert_eq!(state.toggle_chat_bookmark(1), Some(true));
    assert_eq!(chat_ids(state.chats()), before);
    assert_eq!(state.toggle_chat_bookmark(1), Some(false));
    assert_eq!(state.toggle_chat_bookmark(9), None);
}

#[test]
fn test_toggle_message_bookmark_double_toggle_restores() {
    let mut state = state_with_thread(1, &["a", "b"]);
    let before = state.snapshot();
    let id = MessageId::from("a");

    assert_eq!(state.toggle_message_bookmark(1, &id), Some(true));
    assert_eq!(state.bookmarked_messages().len(), 1);
    assert_eq!(state.bookmarked_messages()[0].sender_name, "User 1");
    assert_eq!(state.toggle_message_bookmark(1, &id), Some(false));

    assert_eq!(state.snapshot(), before);
}

#[test]
fn test_toggle_message_bookmark_unknown_message() {
    let mut state = state_with_thread(1, &["a"]);
    assert_eq!(state.toggle_message_bookmark(1, &MessageId::from("zzz")), None);
    assert_eq!(state.toggle_message_bookmark(2, &MessageId::from("a")), None);
    assert!(state.bookmarked_messages().is_empty());
}

#[test]
fn test_bookmark_projection_outlives_thread_reload() {
    let mut state = state_with_thread(1, &["a", "b"]);
    state.toggle_message_bookmark(1, &MessageId::from("a"));

    let token = state.begin_message_load(1);
    state.apply_message_page(1, token, message_page(vec![make_message("b", 101, 1)]));

    assert_eq!(state.bookmarked_messages().len(), 1);
    tokio_test::assert_ok!(state.verify_invariants());
}

// ========== Invariants ==========

#[test]
fn test_verify_invariants_on_empty_state() {
    let state = StoreState::new(ChatOrdering::PinnedFirst);
    tokio_test::assert_ok!(state.verify_invariants());
}

#[test]
fn test_activity_first_state_may_put_active_chat_ahead_of_pins() {
    let mut state = StoreState::new(ChatOrdering::ActivityFirst);
    let ticket = state.begin_chat_listing(ChatFilter::all(), PageRequest::first(20));
    state.apply_chat_page(ticket, page(vec![make_chat(1, 0), make_chat(2, 10)], false));
    state.toggle_pin(1);

    state.apply_polled_messages(2, vec![make_message("x", 102, 50)]);

    assert_eq!(chat_ids(state.chats()), vec![2, 1]);
    tokio_test::assert_ok!(state.verify_invariants());
}
