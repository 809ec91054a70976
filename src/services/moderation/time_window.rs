use chrono::{DateTime, FixedOffset, TimeZone, Timelike, Utc};

use crate::constants::policy::{LOCK_END_HOUR, LOCK_START_HOUR, REFERENCE_UTC_OFFSET_SECONDS};

/// The fixed timezone the lock window is defined in
pub fn reference_zone() -> FixedOffset {
    FixedOffset::east_opt(REFERENCE_UTC_OFFSET_SECONDS).expect("reference offset is within a day")
}

/// Hours 17..=23 and 0..=5 are locked
pub fn is_restricted_hour(hour: u32) -> bool {
    hour >= LOCK_START_HOUR || hour < LOCK_END_HOUR
}

/// Decide on an already-localized time. Minutes and seconds are ignored.
pub fn is_restricted_at<Tz: TimeZone>(local: &DateTime<Tz>) -> bool {
    is_restricted_hour(local.hour())
}

/// Whether chats should be locked at `now`, evaluated in the reference zone
pub fn is_restricted(now: DateTime<Utc>) -> bool {
    is_restricted_at(&now.with_timezone(&reference_zone()))
}
