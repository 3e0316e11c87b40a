// src/util.rs — Shared utility functions

use std::borrow::Cow;

/// Shorten a line for terminal display (UTF-8 safe).
///
/// Lines longer than `max_len` bytes are cut on a character boundary and
/// end with `...`.
pub fn truncate_for_display(s: &str, max_len: usize) -> Cow<'_, str> {
    if s.len() <= max_len {
        return Cow::Borrowed(s);
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Owned(format!("{}...", &s[..end]))
}
