//! Turning parts into message bodies
//!
//! `text_serialize` gives the plain `body`, `md_serialize` the markdown
//! source with pills as permalinks, and `html_serialize_if_needed` the
//! `formatted_body` when the markdown is more than plain paragraphs.

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

use super::parts::{Part, PartKind};
use crate::util::{char_len, char_tail};

/// Base of the permalinks pills are serialized to
pub const PERMALINK_PREFIX: &str = "https://matrix.to/#/";

/// Leading command that turns a message into an emote
pub const EMOTE_PREFIX: &str = "/me ";

fn escape_link_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

pub fn md_serialize(parts: &[Part]) -> String {
    let mut md = String::new();
    for part in parts {
        match part.kind {
            PartKind::Newline => md.push('\n'),
            PartKind::Plain | PartKind::Command | PartKind::PillCandidate | PartKind::AtRoomPill => {
                md.push_str(&part.text)
            }
            PartKind::UserPill | PartKind::RoomPill => {
                let id = part.resource_id.as_deref().unwrap_or(&part.text);
                md.push_str(&format!(
                    "[{}]({}{})",
                    escape_link_text(&part.text),
                    PERMALINK_PREFIX,
                    id
                ));
            }
        }
    }
    md
}

/// The plain `body` of a message
pub fn text_serialize(parts: &[Part]) -> String {
    parts.iter().map(|p| p.text.as_str()).collect()
}

/// Text handed to the slash command parser: user pills become their ids
pub fn command_text(parts: &[Part]) -> String {
    parts
        .iter()
        .map(|p| match p.kind {
            PartKind::UserPill => p.resource_id.as_deref().unwrap_or(&p.text),
            _ => p.text.as_str(),
        })
        .collect()
}

fn leading_command_text(parts: &[Part]) -> String {
    parts
        .iter()
        .take_while(|p| matches!(p.kind, PartKind::Plain | PartKind::Command))
        .map(|p| p.text.as_str())
        .collect()
}

/// Whether the message starts with `/me `
pub fn contains_emote(parts: &[Part]) -> bool {
    leading_command_text(parts).starts_with(EMOTE_PREFIX)
}

/// Copy of `parts` without the first `len` chars
fn strip_chars(parts: &[Part], len: usize) -> Vec<Part> {
    let mut remaining = len;
    let mut stripped = Vec::with_capacity(parts.len());
    for part in parts {
        if remaining == 0 {
            stripped.push(part.clone());
            continue;
        }
        let part_len = part.len();
        if part_len <= remaining {
            remaining -= part_len;
            continue;
        }
        let mut rest = part.clone();
        rest.text = char_tail(&part.text, remaining).to_string();
        remaining = 0;
        stripped.push(rest);
    }
    stripped
}

pub fn strip_emote_command(parts: &[Part]) -> Vec<Part> {
    strip_chars(parts, char_len(EMOTE_PREFIX))
}

/// Drop the escaping backslash of a message starting with `\/`
pub fn unescape_message(parts: &[Part]) -> Vec<Part> {
    match parts.first() {
        Some(first) if first.kind == PartKind::Plain && first.text.starts_with("\\/") => {
            strip_chars(parts, 1)
        }
        _ => parts.to_vec(),
    }
}

fn is_plain_event(event: &Event<'_>) -> bool {
    matches!(
        event,
        Event::Start(Tag::Paragraph) | Event::End(TagEnd::Paragraph) | Event::Text(_) | Event::SoftBreak
    )
}

/// Render markdown to HTML, without the `<p>` wrapper when the document
/// is a single paragraph
fn markdown_to_html(events: Vec<Event<'_>>) -> String {
    let paragraphs = events
        .iter()
        .filter(|e| matches!(e, Event::Start(Tag::Paragraph)))
        .count();
    let unwrap = paragraphs == 1
        && matches!(events.first(), Some(Event::Start(Tag::Paragraph)))
        && matches!(events.last(), Some(Event::End(TagEnd::Paragraph)));
    let len = events.len();
    let body = events
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !unwrap || (*i != 0 && *i != len - 1))
        .map(|(_, event)| match event {
            Event::SoftBreak => Event::HardBreak,
            other => other,
        });

    let mut html_output = String::new();
    html::push_html(&mut html_output, body);
    html_output.trim_end().to_string()
}

/// The `formatted_body` for `parts`: `None` when the markdown renders as
/// plain text, unless `force_html` is set (replies always carry HTML).
pub fn html_serialize_if_needed(parts: &[Part], force_html: bool) -> Option<String> {
    let md = md_serialize(parts);
    let events: Vec<Event<'_>> = Parser::new_ext(&md, Options::ENABLE_STRIKETHROUGH).collect();
    if !force_html && events.iter().all(is_plain_event) {
        return None;
    }
    Some(markdown_to_html(events))
}
