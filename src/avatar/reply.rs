//! Emotion tags embedded in chat replies.
//!
//! Replies carry a machine-readable `[emotion: <label>]` tag, usually at the
//! start. The first tag decides the emotion; every tag is removed before the
//! text is shown.

use super::interface::Emotion;

const TAG_OPEN: &str = "[emotion:";

/// A reply split into display text and the emotion it was tagged with.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedReply {
    pub text: String,
    pub emotion: Emotion,
}

pub fn parse_reply(reply: &str) -> TaggedReply {
    let mut text = String::with_capacity(reply.len());
    let mut label = None;
    let mut rest = reply;

    while let Some((start, end, tag_label)) = find_tag(rest) {
        text.push_str(&rest[..start]);
        label.get_or_insert(tag_label);
        rest = rest[end..].trim_start();
    }
    text.push_str(rest);

    let emotion = label.map(Emotion::parse_lenient).unwrap_or_default();
    TaggedReply {
        text: text.trim().to_string(),
        emotion,
    }
}

/// Byte range and label of the first well-formed tag in `text`.
fn find_tag(text: &str) -> Option<(usize, usize, &str)> {
    // ASCII lowercasing keeps byte offsets aligned with `text`
    let lower = text.to_ascii_lowercase();
    let mut from = 0;

    while let Some(pos) = lower[from..].find(TAG_OPEN) {
        let start = from + pos;
        let after = start + TAG_OPEN.len();
        let body = &text[after..];
        let trimmed = body.trim_start();
        let label_start = after + (body.len() - trimmed.len());
        let label_len = trimmed
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(trimmed.len());

        if label_len > 0 && trimmed[label_len..].starts_with(']') {
            let label_end = label_start + label_len;
            return Some((start, label_end + 1, &text[label_start..label_end]));
        }
        from = after;
    }
    None
}
