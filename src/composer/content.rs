//! Outgoing message content
//!
//! Turns the composer's parts into the event content handed to the client:
//! emotes and escaped slashes are resolved, markdown becomes
//! `formatted_body` when it is not plain text, and replies carry the
//! relation plus a quoted fallback of the event they answer.

use crate::client::{InReplyTo, MessageContent, MessageType, RelatesTo, RoomEvent};
use crate::editor::serialize::PERMALINK_PREFIX;
use crate::editor::{
    contains_emote, html_serialize_if_needed, strip_emote_command, text_serialize,
    unescape_message, Part, PartKind,
};

pub const HTML_FORMAT: &str = "org.matrix.custom.html";

/// Whether the message is a command rather than text to send. Plain text
/// starting with `/` counts too, so a command is never sent as a message.
pub fn is_slash_command(parts: &[Part]) -> bool {
    match parts.first() {
        Some(first) => {
            first.kind == PartKind::Command
                || (first.kind == PartKind::Plain && first.text.starts_with('/'))
        }
        None => false,
    }
}

pub fn create_message_content(
    parts: &[Part],
    reply_to: Option<&RoomEvent>,
    room_id: &str,
) -> MessageContent {
    let is_emote = contains_emote(parts);
    let parts = if is_emote {
        strip_emote_command(parts)
    } else {
        parts.to_vec()
    };
    let parts = unescape_message(&parts);

    let formatted_body = html_serialize_if_needed(&parts, reply_to.is_some());
    let mut content = MessageContent {
        msgtype: if is_emote {
            MessageType::Emote
        } else {
            MessageType::Text
        },
        body: text_serialize(&parts),
        format: formatted_body.as_ref().map(|_| HTML_FORMAT.to_string()),
        formatted_body,
        relates_to: None,
    };
    if let Some(event) = reply_to {
        add_reply_to_message_content(&mut content, event, room_id);
    }
    content
}

/// Relate `content` to `event` and prepend the quoted fallback
fn add_reply_to_message_content(content: &mut MessageContent, event: &RoomEvent, room_id: &str) {
    content.relates_to = Some(RelatesTo {
        in_reply_to: InReplyTo {
            event_id: event.event_id.clone(),
        },
    });

    let event_link = format!("{}{}/{}", PERMALINK_PREFIX, room_id, event.event_id);
    let user_link = format!("{}{}", PERMALINK_PREFIX, event.sender);
    let html = format!(
        "<mx-reply><blockquote><a href=\"{}\">In reply to</a> <a href=\"{}\">{}</a><br>{}</blockquote></mx-reply>",
        event_link,
        user_link,
        escape_html(&event.sender),
        escape_html(&event.body).replace('\n', "<br/>"),
    );
    if let Some(formatted) = content.formatted_body.as_mut() {
        formatted.insert_str(0, &html);
    }

    let mut lines: Vec<String> = event.body.trim().split('\n').map(str::to_string).collect();
    if let Some(first) = lines.first_mut() {
        *first = format!("<{}> {}", event.sender, first);
    }
    let quoted: Vec<String> = lines.iter().map(|line| format!("> {}", line)).collect();
    content.body = format!("{}\n\n{}", quoted.join("\n"), content.body);
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
