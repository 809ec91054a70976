use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Which audit ledger an action belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Ban,
    Kick,
}

impl ActionKind {
    pub fn table(&self) -> &'static str {
        match self {
            ActionKind::Ban => "ban_log",
            ActionKind::Kick => "kick_log",
        }
    }
}

/// Write-once audit entry for a ban or a kick
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ActionLogEntry {
    pub id: Uuid,
    pub chat_id: i64,
    pub user_id: i64,
    pub reason: String,
    pub logged_at: DateTime<Utc>,
}
