//! Tag scanner — two passes over the raw block.
//!
//! Pass one cuts the text into `@`-introduced segments: each segment runs
//! from just after an `@` to the next `@`, line break, or end of text, with
//! trailing blanks dropped. Pass two splits a segment into key and value.
//!
//! Terminating `@`s are never consumed, so `@a x @b y` yields both `a x`
//! and `b y`.

/// Blanks that may sit between a tag (or its value) and the terminator.
/// `\r` is included so `\r\n` line endings terminate like `\n`.
fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r')
}

fn is_terminator(c: char) -> bool {
    c == '@' || c == '\n'
}

pub(crate) fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// `true` when `s` is a well-formed annotation key.
pub fn is_key(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_key_char)
}

/// Text from the start of `rest` up to the first terminator, trailing blanks removed.
fn body(rest: &str) -> &str {
    let end = rest.find(is_terminator).unwrap_or(rest.len());
    rest[..end].trim_end_matches(is_blank)
}

/// The remainder of `text` after each `@`, in order.
fn after_each_at(text: &str) -> impl Iterator<Item = &str> {
    text.match_indices('@').map(move |(at, _)| &text[at + 1..])
}

/// Every candidate tag body in `text`.
pub(crate) fn segments(text: &str) -> impl Iterator<Item = &str> {
    after_each_at(text).map(body)
}

/// A classified segment.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Tag<'a> {
    /// `key value`, split at the first space.
    Valued { key: &'a str, raw: &'a str },
    /// `key` alone.
    Bare(&'a str),
    /// Anything that does not start with a key followed by a space.
    Malformed(&'a str),
}

pub(crate) fn classify(segment: &str) -> Tag<'_> {
    if let Some((key, raw)) = segment.split_once(' ') {
        if is_key(key) {
            return Tag::Valued { key, raw };
        }
    }
    if is_key(segment) {
        Tag::Bare(segment)
    } else {
        Tag::Malformed(segment)
    }
}

/// `true` if `@key` appears followed only by blanks before a terminator or end of text.
pub(crate) fn has_bare(text: &str, key: &str) -> bool {
    after_each_at(text).any(|rest| match rest.strip_prefix(key) {
        Some(after) => {
            let after = after.trim_start_matches(is_blank);
            after.is_empty() || after.starts_with(is_terminator)
        }
        None => false,
    })
}

/// Raw value text of every `@key <value>` occurrence, in order.
pub(crate) fn values_of<'a>(text: &'a str, key: &'a str) -> impl Iterator<Item = &'a str> {
    after_each_at(text).filter_map(move |rest| rest.strip_prefix(key)?.strip_prefix(' ').map(body))
}
