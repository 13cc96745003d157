//! Turning text and persisted state back into parts

use super::parts::{Part, PartCreator, SerializedPart};
use super::operations::QUOTE_LINE_PREFIX;

/// Parse plain text into plain and newline parts. With `is_quoted_message`
/// every line gets the `> ` quote prefix.
pub fn parse_plain_text_message(body: &str, pc: &PartCreator, is_quoted_message: bool) -> Vec<Part> {
    let mut parts = Vec::new();
    for (i, line) in body.split('\n').enumerate() {
        if i != 0 {
            parts.push(pc.newline());
        }
        let line = if is_quoted_message {
            format!("{}{}", QUOTE_LINE_PREFIX, line)
        } else {
            line.to_string()
        };
        if !line.is_empty() {
            parts.push(pc.plain(line));
        }
    }
    parts
}

/// Parse a JSON array of serialized parts, as written for drafts and send
/// history
pub fn parse_serialized_parts(json: &str, pc: &PartCreator) -> serde_json::Result<Vec<Part>> {
    let serialized: Vec<SerializedPart> = serde_json::from_str(json)?;
    Ok(serialized.iter().map(|p| pc.deserialize_part(p)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::PartKind;

    #[test]
    fn test_plain_text_lines() {
        let pc = PartCreator::new();
        let parts = parse_plain_text_message("one\n\ntwo", &pc, false);
        let kinds: Vec<PartKind> = parts.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![PartKind::Plain, PartKind::Newline, PartKind::Newline, PartKind::Plain]
        );
        assert!(parse_plain_text_message("", &pc, false).is_empty());
    }

    #[test]
    fn test_quoted_lines_are_prefixed() {
        let pc = PartCreator::new();
        let parts = parse_plain_text_message("hi\nthere", &pc, true);
        let text: String = parts.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(text, "> hi\n> there");
    }

    #[test]
    fn test_serialized_parts_from_json() {
        let pc = PartCreator::new();
        let json = r#"[{"type":"plain","text":"hi "},{"type":"user-pill","text":"Alice","resourceId":"@alice:example.org"}]"#;
        let parts = parse_serialized_parts(json, &pc).unwrap();
        assert_eq!(parts[1].kind, PartKind::UserPill);
        assert_eq!(parts[1].resource_id.as_deref(), Some("@alice:example.org"));
        assert!(parse_serialized_parts("{not json", &pc).is_err());
    }
}
