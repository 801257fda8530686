/// Text helpers used while normalizing provider payloads
pub mod text {
    /// `Some(trimmed)` when the value carries any non-whitespace text.
    pub fn non_empty(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    /// Keep the first `max_chars` characters. Never splits a code point.
    pub fn truncate_chars(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            Some((byte_index, _)) => text[..byte_index].to_string(),
            None => text.to_string(),
        }
    }
}

/// URL utilities
pub mod url {
    use url::Url;

    /// Only http(s) URLs can be article identities.
    pub fn is_article_url(url_str: &str) -> bool {
        match Url::parse(url_str) {
            Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
            Err(_) => false,
        }
    }

    /// Extract domain from URL
    pub fn extract_domain(url_str: &str) -> Option<String> {
        Url::parse(url_str).ok()?.domain().map(|d| d.to_string())
    }
}

/// Time utilities
pub mod time {
    use chrono::{DateTime, Utc};

    /// Parse an RFC 3339 timestamp, falling back to `now` when absent or malformed.
    pub fn parse_or(value: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
        value
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
            .unwrap_or(now)
    }

    /// Coarse relative age: "3 days ago", "1 hour ago", "Just now".
    pub fn time_ago(published_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
        let minutes = now.signed_duration_since(published_at).num_minutes();
        let hours = minutes / 60;
        let days = hours / 24;

        let plural = |n: i64, unit: &str| format!("{} {}{} ago", n, unit, if n > 1 { "s" } else { "" });

        if days > 0 {
            plural(days, "day")
        } else if hours > 0 {
            plural(hours, "hour")
        } else if minutes > 0 {
            plural(minutes, "minute")
        } else {
            "Just now".to_string()
        }
    }
}
