//! Send composer tests - sending, replies, drafts and history on disk

mod common;

use std::rc::Rc;

use common::{alt, key, send_composer, test_room, type_send, ROOM_ID};
use cider::client::{MessageType, RoomEvent};
use cider::commands::Cmd;
use cider::composer::{DRAFT_KEY_PREFIX, HTML_FORMAT};
use cider::messages::{ComposerMsg, Key};
use cider::storage::{FileStorage, MemoryStorage, Storage};

fn bob_said(body: &str) -> RoomEvent {
    RoomEvent {
        event_id: "$bob1".to_string(),
        sender: "@bob:example.org".to_string(),
        body: body.to_string(),
    }
}

#[test]
fn test_reply_carries_relation_and_fallbacks() {
    let room = test_room();
    let mut c = send_composer(&room, Rc::new(MemoryStorage::new()));
    c.update(ComposerMsg::ReplyTo(Some(bob_said("lunch?\nat noon"))));
    assert!(c.reply_to().is_some());
    type_send(&mut c, "sure");

    let cmd = c.update(key(Key::Enter));
    assert_eq!(
        cmd,
        Some(Cmd::Batch(vec![Cmd::ClearReply, Cmd::PreventDefault]))
    );
    assert!(c.reply_to().is_none());

    let sent = room.sent();
    assert_eq!(sent.len(), 1);
    let content = &sent[0];
    assert_eq!(
        content.relates_to.as_ref().map(|r| r.in_reply_to.event_id.as_str()),
        Some("$bob1")
    );
    assert_eq!(
        content.body,
        "> <@bob:example.org> lunch?\n> at noon\n\nsure"
    );
    assert_eq!(content.format.as_deref(), Some(HTML_FORMAT));
    let html = content.formatted_body.as_deref().unwrap();
    assert!(html.starts_with("<mx-reply><blockquote>"));
    assert!(html.contains(&format!("{}/$bob1", ROOM_ID)));
    assert!(html.contains("lunch?<br/>at noon"));
    assert!(html.ends_with("sure"));
}

#[test]
fn test_emote_is_sent_without_prefix() {
    let room = test_room();
    let mut c = send_composer(&room, Rc::new(MemoryStorage::new()));
    type_send(&mut c, "/me waves");
    c.update(key(Key::Enter));
    let sent = room.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].msgtype, MessageType::Emote);
    assert_eq!(sent[0].body, "waves");
    assert!(room.commands().is_empty());
}

#[test]
fn test_escaped_slash_is_sent_as_text() {
    let room = test_room();
    let mut c = send_composer(&room, Rc::new(MemoryStorage::new()));
    type_send(&mut c, "\\/not a command");
    c.update(key(Key::Enter));
    assert!(room.commands().is_empty());
    assert_eq!(room.sent()[0].body, "/not a command");
}

#[test]
fn test_draft_survives_reopening_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let room = test_room();
    {
        let storage = Rc::new(FileStorage::open(&path).unwrap());
        let mut c = send_composer(&room, storage.clone());
        type_send(&mut c, "half written");
        let key = format!("{}{}", DRAFT_KEY_PREFIX, ROOM_ID);
        assert!(storage.get(&key).unwrap().is_some());
    }

    let storage = Rc::new(FileStorage::open(&path).unwrap());
    let mut c = send_composer(&room, storage.clone());
    assert_eq!(c.model().text(), "half written");

    c.update(key(Key::Enter));
    let key = format!("{}{}", DRAFT_KEY_PREFIX, ROOM_ID);
    assert_eq!(storage.get(&key).unwrap(), None);
}

#[test]
fn test_send_history_survives_reopening_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let room = test_room();
    {
        let mut c = send_composer(&room, Rc::new(FileStorage::open(&path).unwrap()));
        type_send(&mut c, "first");
        c.update(key(Key::Enter));
        type_send(&mut c, "second");
        c.update(key(Key::Enter));
    }

    let mut c = send_composer(&room, Rc::new(FileStorage::open(&path).unwrap()));
    assert_eq!(c.send_history().len(), 2);
    assert_eq!(c.update(alt(Key::ArrowUp)), Some(Cmd::PreventDefault));
    assert_eq!(c.model().text(), "second");
    c.update(alt(Key::ArrowUp));
    assert_eq!(c.model().text(), "first");
    // the oldest entry stays put
    c.update(alt(Key::ArrowUp));
    assert_eq!(c.model().text(), "first");
}

#[test]
fn test_up_in_middle_of_text_does_not_edit() {
    let room = test_room();
    let mut c = send_composer(&room, Rc::new(MemoryStorage::new()));
    type_send(&mut c, "sent");
    c.update(key(Key::Enter));
    type_send(&mut c, "next");
    assert_eq!(c.update(key(Key::ArrowUp)), None);
}
