use chrono::{DateTime, Utc};

use crate::db::models::{ActionLogEntry, MuteRecord, WarnRecord};

/// Format a user mention
pub fn mention_user(user_id: u64) -> String {
    format!("<@{}>", user_id)
}

/// Timestamp as shown in listings
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn warn_line(record: &WarnRecord) -> String {
    format!("ID: {} — {} warnings", record.user_id, record.warn_count)
}

pub fn mute_line(record: &MuteRecord) -> String {
    match record.until {
        Some(until) => format!(
            "ID: {} — until {} ({})",
            record.user_id,
            format_timestamp(until),
            record.kind
        ),
        None => format!("ID: {} — indefinitely ({})", record.user_id, record.kind),
    }
}

pub fn action_line(entry: &ActionLogEntry) -> String {
    format!("ID: {} — {}", entry.user_id, format_timestamp(entry.logged_at))
}

/// Join listing lines under a header, or fall back to `empty`
pub fn listing<T>(header: &str, empty: &str, items: &[T], line: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return empty.to_string();
    }

    let body = items.iter().map(line).collect::<Vec<_>>().join("\n");
    format!("{}\n{}", header, body)
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::db::models::MuteKind;

    #[test]
    fn test_mute_lines() {
        let until = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let timed = MuteRecord {
            chat_id: 1,
            user_id: 99,
            until: Some(until),
            kind: MuteKind::Auto,
        };
        assert_eq!(mute_line(&timed), "ID: 99 — until 2024-01-02 03:04:05 (auto)");

        let forever = MuteRecord {
            until: None,
            kind: MuteKind::Manual,
            ..timed
        };
        assert_eq!(mute_line(&forever), "ID: 99 — indefinitely (manual)");
    }

    #[test]
    fn test_listing_empty_and_filled() {
        let none: Vec<u32> = vec![];
        assert_eq!(listing("Header:", "Nothing.", &none, |n| n.to_string()), "Nothing.");
        assert_eq!(
            listing("Header:", "Nothing.", &[1, 2], |n| format!("#{}", n)),
            "Header:\n#1\n#2"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long line", 9), "a very...");
    }
}
