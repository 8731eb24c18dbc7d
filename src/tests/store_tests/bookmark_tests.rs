// Bookmark Tests - Testing BookmarkedMessage projection and sender names

use crate::store::bookmark::{sender_name, LOCAL_SENDER_LABEL};
use crate::store::{BookmarkedMessage, Message, MessageId};
use crate::tests::support::{make_chat, make_message};

#[test]
fn test_projection_copies_message_fields() {
    let chat = make_chat(7, 0);
    let message = make_message("msg_1", -7, 3);

    let projection = BookmarkedMessage::project(7, &message, Some(&chat));

    assert_eq!(projection.id, message.id);
    assert_eq!(projection.chat_id, 7);
    assert_eq!(projection.content, message.content);
    assert_eq!(projection.created_at, message.created_at);
    assert_eq!(projection.sender_name, "User 7");
}

#[test]
fn test_sender_name_from_counterpart() {
    let mut chat = make_chat(7, 0);
    chat.counterpart.profile.first_name = "Tomas".to_string();
    chat.counterpart.profile.last_name = "Berg".to_string();

    let message = make_message("msg_1", -7, 0);
    assert_eq!(sender_name(&message, Some(&chat)), "Tomas Berg");
}

#[test]
fn test_sender_name_falls_back_without_chat() {
    let message = make_message("msg_1", -55, 0);
    assert_eq!(sender_name(&message, None), "User -55");
}

#[test]
fn test_sender_name_falls_back_on_empty_profile() {
    let mut chat = make_chat(7, 0);
    chat.counterpart.profile.first_name.clear();
    chat.counterpart.profile.last_name.clear();

    let message = make_message("msg_1", -7, 0);
    assert_eq!(sender_name(&message, Some(&chat)), "User -7");
}

#[test]
fn test_local_sender_is_you() {
    let chat = make_chat(7, 0);
    let message = Message::new_local("mine");

    assert_eq!(sender_name(&message, Some(&chat)), LOCAL_SENDER_LABEL);
    assert_eq!(LOCAL_SENDER_LABEL, "You");
}

#[test]
fn test_refers_to_needs_both_ids() {
    let message = make_message("msg_1", -7, 0);
    let projection = BookmarkedMessage::project(7, &message, None);

    assert!(projection.refers_to(7, &MessageId::from("msg_1")));
    assert!(!projection.refers_to(8, &MessageId::from("msg_1")));
    assert!(!projection.refers_to(7, &MessageId::from("msg_2")));
}
