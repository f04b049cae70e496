//! Small UI helpers: truncation with a continuation marker.

/// Marker appended to text cut short by [`wrap`].
pub const CONTINUATION: char = '+';

/// Returns `s` if it is shorter than `n` characters, otherwise its first `n - 1`
/// characters followed by `+`.
pub fn wrap(s: &str, n: usize) -> String {
    if s.chars().count() < n {
        return s.to_string();
    }
    if n == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(n - 1).collect();
    out.push(CONTINUATION);
    out
}

/// Keeps at most `n` characters of `s`.
pub fn clip(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
