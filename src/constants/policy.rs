//! Fixed moderation policy. None of this is configurable at runtime.

/// The only links members may post
pub const ALLOWED_LINKS: &[&str] = &["https://t.me/TikTokModDownload", "https://t.me/ChatTTMD"];

/// Warn count at which a user is muted automatically
pub const WARN_THRESHOLD: u32 = 3;

/// First hour of the nightly lock (inclusive)
pub const LOCK_START_HOUR: u32 = 17;

/// First hour after the nightly lock (exclusive end of the lock)
pub const LOCK_END_HOUR: u32 = 6;

/// Offset of the reference timezone (Europe/Moscow, no DST)
pub const REFERENCE_UTC_OFFSET_SECONDS: i32 = 3 * 3600;
