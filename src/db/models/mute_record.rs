use chrono::{DateTime, Utc};

/// Who issued a mute. Only manual mutes are released by the expiry scan;
/// auto mutes rely on the platform-side expiry of the restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "mute_kind", rename_all = "lowercase")]
pub enum MuteKind {
    Manual,
    Auto,
}

impl MuteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MuteKind::Manual => "manual",
            MuteKind::Auto => "auto",
        }
    }
}

impl std::fmt::Display for MuteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MuteRecord {
    pub chat_id: i64,
    pub user_id: i64,
    /// `None` means indefinite
    pub until: Option<DateTime<Utc>>,
    pub kind: MuteKind,
}

impl MuteRecord {
    /// Still in force at `now`. Indefinite mutes are always active.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.until.map_or(true, |until| until > now)
    }

    /// Has a concrete expiry that has been reached at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.until.is_some_and(|until| until <= now)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn record(until: Option<DateTime<Utc>>) -> MuteRecord {
        MuteRecord {
            chat_id: 1,
            user_id: 2,
            until,
            kind: MuteKind::Manual,
        }
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mute = record(Some(t));

        assert!(!mute.is_expired(t - Duration::seconds(1)));
        assert!(mute.is_expired(t));
        assert!(mute.is_expired(t + Duration::hours(5)));
        assert!(mute.is_active(t - Duration::seconds(1)));
        assert!(!mute.is_active(t));
    }

    #[test]
    fn test_indefinite_mute_never_expires() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let mute = record(None);

        assert!(!mute.is_expired(now));
        assert!(mute.is_active(now));
    }
}
