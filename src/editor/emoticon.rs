//! Emoticon to emoji auto-replacement
//!
//! Runs as the model's transform hook: after each update it looks at most
//! eight chars back from the caret for an emoticon followed by whitespace,
//! and replaces it with the emoji plus a single space.

use super::diff::Diff;
use super::model::EditorModel;
use super::parts::PartKind;
use super::position::DocumentPosition;
use super::EditorError;
use crate::messages::InputType;

/// How far back from the caret an emoticon may start
const LOOKBACK: usize = 8;

/// Known emoticons, keyed by their lowercase form with the nose removed
static EMOTICONS: &[(&str, &str)] = &[
    (":)", "🙂"),
    ("(:", "🙂"),
    (":d", "😄"),
    ("xd", "😆"),
    (";)", "😉"),
    (":p", "😛"),
    (";p", "😜"),
    (":(", "🙁"),
    ("):", "🙁"),
    (":'(", "😢"),
    (":o", "😮"),
    (":|", "😐"),
    (":/", "😕"),
    (":*", "😘"),
    (":$", "😳"),
    ("b)", "😎"),
    ("8)", "😎"),
    (">:(", "😠"),
    (":@", "😠"),
    ("o:)", "😇"),
    (">:)", "😈"),
    ("<3", "❤️"),
    ("</3", "💔"),
    (":+1", "👍"),
    (":-1", "👎"),
];

/// Emoji for an emoticon as typed (case-insensitive, `:-)` same as `:)`)
pub fn emoji_for_emoticon(emoticon: &str) -> Option<&'static str> {
    let lower = emoticon.to_lowercase();
    if let Some(hit) = lookup(&lower) {
        return Some(hit);
    }
    let query = lower.replacen('-', "", 1);
    lookup(&query)
}

fn lookup(query: &str) -> Option<&'static str> {
    EMOTICONS
        .iter()
        .find(|(emoticon, _)| *emoticon == query)
        .map(|(_, emoji)| *emoji)
}

/// Find a trailing `<emoticon><whitespace>` preceded by whitespace or the
/// start of `text`. Returns the char offset of the emoticon and the emoji.
fn match_trailing_emoticon(text: &str) -> Option<(usize, &'static str)> {
    let chars: Vec<char> = text.chars().collect();
    let (last, body) = chars.split_last()?;
    if !last.is_whitespace() {
        return None;
    }
    let start = body
        .iter()
        .rposition(|c| c.is_whitespace())
        .map_or(0, |i| i + 1);
    let token: String = body[start..].iter().collect();
    if token.is_empty() {
        return None;
    }
    emoji_for_emoticon(&token).map(|emoji| (start, emoji))
}

/// Transform hook replacing an emoticon just before the caret
pub fn replace_emoticon(
    model: &mut EditorModel,
    caret: DocumentPosition,
    _input_type: &InputType,
    _diff: &Diff,
) -> Result<isize, EditorError> {
    let mut range = model.start_range(caret, None);
    let mut remaining = LOOKBACK;
    range.expand_backwards_while(model, |_, _, part| {
        if remaining == 0 {
            return false;
        }
        remaining -= 1;
        matches!(part.kind, PartKind::Plain | PartKind::PillCandidate)
    })?;
    let text = range.text(model)?;
    let Some((start, emoji)) = match_trailing_emoticon(&text) else {
        return Ok(0);
    };
    range.move_start(model, start)?;
    tracing::debug!(emoji, "replacing emoticon");
    let replacement = model.part_creator().plain(format!("{} ", emoji));
    range.replace(model, vec![replacement])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_normalizes_case_and_nose() {
        assert_eq!(emoji_for_emoticon(":)"), Some("🙂"));
        assert_eq!(emoji_for_emoticon(":-)"), Some("🙂"));
        assert_eq!(emoji_for_emoticon(":D"), Some("😄"));
        assert_eq!(emoji_for_emoticon(":-1"), Some("👎"));
        assert_eq!(emoji_for_emoticon(":-P"), Some("😛"));
        assert_eq!(emoji_for_emoticon("hello"), None);
    }

    #[test]
    fn test_match_requires_trailing_whitespace() {
        assert_eq!(match_trailing_emoticon("hi :) "), Some((3, "🙂")));
        assert_eq!(match_trailing_emoticon(":) "), Some((0, "🙂")));
        assert_eq!(match_trailing_emoticon("hi :)"), None);
        assert_eq!(match_trailing_emoticon("hi:) "), None);
        assert_eq!(match_trailing_emoticon("  "), None);
    }
}
