// src/util.rs — Shared helpers

use std::borrow::Cow;

/// Shorten `s` to at most `max_chars` characters for logs and status
/// lines, marking the cut with an ellipsis.
pub fn truncate_str(s: &str, max_chars: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max_chars) {
        None => Cow::Borrowed(s),
        Some(_) if max_chars == 0 => Cow::Borrowed(""),
        Some(_) => {
            let keep: String = s.chars().take(max_chars.saturating_sub(1)).collect();
            Cow::Owned(format!("{keep}\u{2026}"))
        }
    }
}
