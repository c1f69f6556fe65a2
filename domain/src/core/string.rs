//! String utilities for the domain layer.

/// Truncate a string to at most `max_chars` characters (UTF-8 safe).
///
/// Counts characters rather than bytes; no ellipsis is appended.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Lowercase and collapse all runs of whitespace into single spaces.
pub fn normalize_whitespace_lower(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
