//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use chrono::{DateTime, Utc};
use url::Url;

/// Maximum length of a standalone text message
pub const MAX_TEXT_LEN: usize = 4096;

/// Maximum length of a caption attached to media
pub const MAX_CAPTION_LEN: usize = 1024;

/// Fallback link used when a channel has nothing better to offer
pub const FALLBACK_CHANNEL_URL: &str = "https://t.me/";

/// Split text into consecutive pieces of at most `max_chars` characters.
///
/// Splitting is done on character boundaries so multi-byte text never panics.
/// An empty input yields a single empty piece.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.is_empty() {
        return vec![String::new()];
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Resolve the public link for a channel.
///
/// Preference order: handle-derived link, invite link, raw URL when it
/// already looks like an HTTP(S) link.
pub fn normalize_channel_url(
    username: Option<&str>,
    invite_link: Option<&str>,
    raw_url: Option<&str>,
) -> Option<String> {
    if let Some(username) = username.map(str::trim).filter(|u| !u.is_empty()) {
        return Some(format!("https://t.me/{}", username.trim_start_matches('@')));
    }
    if let Some(link) = invite_link.map(str::trim).filter(|l| is_http_link(l)) {
        return Some(link.to_string());
    }
    raw_url
        .map(str::trim)
        .filter(|u| is_http_link(u))
        .map(str::to_string)
}

/// Parse an HTTP(S) link that Telegram will accept on a URL button
pub fn parse_http_link(text: &str) -> Option<Url> {
    let url = Url::parse(text.trim()).ok()?;
    let has_host = url.host_str().is_some_and(|host| !host.is_empty());
    (matches!(url.scheme(), "http" | "https") && has_host).then_some(url)
}

/// Whether the operator typed a usable link
pub fn is_http_link(text: &str) -> bool {
    parse_http_link(text).is_some()
}

/// Truncate text to a maximum number of characters, appending an ellipsis
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Parse a numeric user or chat id typed by an operator
pub fn parse_numeric_id(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

/// Full display name from first/last name parts
pub fn full_name(first_name: Option<&str>, last_name: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [first_name, last_name]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_text_limits() {
        let text = "a".repeat(MAX_TEXT_LEN * 2 + 10);
        let parts = chunk_text(&text, MAX_TEXT_LEN);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), MAX_TEXT_LEN);
        assert_eq!(parts[2].len(), 10);
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_chunk_text_multibyte() {
        let parts = chunk_text("ўзбекча", 3);
        assert_eq!(parts, vec!["ўзб", "екч", "а"]);
    }

    #[test]
    fn test_chunk_text_empty() {
        assert_eq!(chunk_text("", 10), vec![String::new()]);
    }

    #[test]
    fn test_normalize_channel_url_preference() {
        assert_eq!(
            normalize_channel_url(Some("@news"), Some("https://t.me/+abc"), None),
            Some("https://t.me/news".to_string())
        );
        assert_eq!(
            normalize_channel_url(None, Some("https://t.me/+abc"), Some("https://x.y")),
            Some("https://t.me/+abc".to_string())
        );
        assert_eq!(
            normalize_channel_url(None, None, Some("https://x.y")),
            Some("https://x.y".to_string())
        );
        assert_eq!(normalize_channel_url(None, None, Some("t.me/x")), None);
        assert_eq!(
            normalize_channel_url(None, Some("https://"), Some("https://t.me/+raw")),
            Some("https://t.me/+raw".to_string()),
            "a broken invite link is skipped"
        );
        assert_eq!(normalize_channel_url(None, Some("https://"), Some("http://")), None);
        assert_eq!(normalize_channel_url(Some(""), None, None), None);
    }

    #[test]
    fn test_http_links_need_a_host() {
        assert!(is_http_link("https://t.me/+abcdef"));
        assert!(is_http_link(" http://example.org/join "));
        assert!(!is_http_link("https://"));
        assert!(!is_http_link("http://"));
        assert!(!is_http_link("ftp://t.me/x"));
        assert!(!is_http_link("https//t.me/x"));
        assert!(!is_http_link("t.me/+abcdef"));
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello world", 5), "hello...");
    }

    #[test]
    fn test_full_name() {
        assert_eq!(full_name(Some("Ada"), Some("Lovelace")), Some("Ada Lovelace".to_string()));
        assert_eq!(full_name(Some("Ada"), None), Some("Ada".to_string()));
        assert_eq!(full_name(None, Some(" ")), None);
    }

    #[test]
    fn test_parse_numeric_id() {
        assert_eq!(parse_numeric_id(" -100123 "), Some(-100123));
        assert_eq!(parse_numeric_id("@name"), None);
    }
}
