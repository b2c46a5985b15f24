//! General utilities shared across the application.

use std::time::{SystemTime, UNIX_EPOCH};

// ─────────────────────────────────────────────────────────────────────────────
// Time Utilities
// ─────────────────────────────────────────────────────────────────────────────

/// Returns the current Unix timestamp in milliseconds.
///
/// Returns 0 if the system clock is before the Unix epoch (shouldn't happen in practice).
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ─────────────────────────────────────────────────────────────────────────────
// XML Encoding
// ─────────────────────────────────────────────────────────────────────────────

/// Escapes XML special characters for embedding in XML content or attributes.
///
/// # Example
/// ```ignore
/// assert_eq!(escape_xml("Tom & Jerry"), "Tom &amp; Jerry");
/// assert_eq!(escape_xml("<title>"), "&lt;title&gt;");
/// ```
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

// ─────────────────────────────────────────────────────────────────────────────
// Content Locations
// ─────────────────────────────────────────────────────────────────────────────

/// Reduces a directory search-result URL to the bare station identifier.
///
/// Directory providers hand out locations such as
/// `http://opml.radiotime.com/Tune.ashx?id=s12345&formats=mp3`, while the
/// device's select API expects just `s12345`. If the location carries a
/// query parameter named exactly `id` with a non-empty value, that value is
/// returned; any other location is returned unchanged.
#[must_use]
pub fn normalize_location(location: &str) -> String {
    let Some((_, query)) = location.split_once('?') else {
        return location.to_string();
    };

    let query = query.split('#').next().unwrap_or_default();
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, value)| *key == "id" && !value.is_empty())
        .map(|(_, value)| value.to_string())
        .unwrap_or_else(|| location.to_string())
}
