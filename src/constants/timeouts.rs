use std::time::Duration;

/// Auto-mute applied when a user reaches the warn threshold
pub const AUTO_MUTE_DURATION: Duration = Duration::from_secs(60 * 60);

/// Manual mute length when `mute` is given no usable argument
pub const DEFAULT_MUTE_MINUTES: i64 = 60;

/// Upper bound on a single gateway call (overridable via env)
pub const DEFAULT_GATEWAY_TIMEOUT_SECONDS: u64 = 10;

/// Format duration for display
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();

    if total_secs < 60 {
        format!("{} seconds", total_secs)
    } else if total_secs < 3600 {
        let mins = total_secs / 60;
        format!("{} minute{}", mins, if mins == 1 { "" } else { "s" })
    } else if total_secs < 86400 {
        let hours = total_secs / 3600;
        format!("{} hour{}", hours, if hours == 1 { "" } else { "s" })
    } else {
        let days = total_secs / 86400;
        format!("{} day{}", days, if days == 1 { "" } else { "s" })
    }
}
