//! Keeps upstream payloads out of the logs.
//!
//! Passive sources can answer with multi-megabyte JSON or HTML; debug and error
//! logs only ever get a bounded prefix.

/// Bytes of a payload kept in a log line.
const LOG_PREVIEW_BYTES: usize = 256;

/// Largest index `<= index` that lies on a char boundary of `s`.
fn char_boundary_at_or_before(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    (0..=index).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

/// Shorten a payload for logging, noting the full size when it was cut.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= LOG_PREVIEW_BYTES {
        return s.to_string();
    }
    let end = char_boundary_at_or_before(s, LOG_PREVIEW_BYTES);
    format!("{}... [truncated, total {} bytes]", &s[..end], s.len())
}
