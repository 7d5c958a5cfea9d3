//! Trigger phrase matching and payload extraction.

/// Extract the command payload from `message`.
///
/// The phrase must occur in the message (ASCII-case-insensitive substring,
/// no regex). When both bracket characters are configured the payload is
/// the text strictly between the first `start_char` at-or-after the phrase
/// and the next `end_char` after that, returned exactly as written; with
/// no brackets configured it is the trimmed remainder of the message after
/// the phrase. Any failure — empty phrase, phrase absent, brackets not
/// found in order, empty payload — yields `None`.
#[must_use]
pub fn match_trigger(
    message: &str,
    phrase: &str,
    start_char: Option<char>,
    end_char: Option<char>,
) -> Option<String> {
    if phrase.is_empty() {
        return None;
    }
    let phrase_at = find_ignore_ascii_case(message, phrase)?;
    let after = &message[phrase_at + phrase.len()..];
    let payload = match (start_char, end_char) {
        (Some(open), Some(close)) => bracketed(after, open, close)?,
        (Some(_) | None, _) => after.trim(),
    };
    if payload.is_empty() {
        None
    } else {
        Some(payload.to_owned())
    }
}

/// Whether `needle` occurs in `haystack`, ignoring ASCII case.
#[must_use]
pub fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    find_ignore_ascii_case(haystack, needle).is_some()
}

fn bracketed(rest: &str, open: char, close: char) -> Option<&str> {
    let open_at = rest.find(open)?;
    let inner = &rest[open_at + open.len_utf8()..];
    let close_at = inner.find(close)?;
    Some(&inner[..close_at])
}

/// Byte offset of the first ASCII-case-insensitive occurrence of `needle`.
/// Candidate windows are sliced with `get` so non-boundary offsets are
/// skipped rather than panicking.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let len = needle.len();
    if len == 0 {
        return Some(0);
    }
    (0..=haystack.len().checked_sub(len)?).find(|&i| {
        haystack
            .get(i..i + len)
            .is_some_and(|window| window.eq_ignore_ascii_case(needle))
    })
}
