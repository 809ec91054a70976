//! Penalty ledger: warn counters, mute records and the ban/kick audit logs.
//!
//! Pure data access. Nothing in here talks to the transport, and store
//! failures are returned to the caller without retrying.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db::models::{ActionKind, ActionLogEntry, MuteKind, MuteRecord, WarnRecord};

pub mod memory;
pub mod postgres;

pub use memory::MemoryLedger;
pub use postgres::PgLedger;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait PenaltyLedger: Send + Sync {
    /// Add a warning and return the new count (1 for a first warning).
    async fn warn(&self, user_id: i64) -> Result<u32, LedgerError>;

    /// Remove a warning, floored at zero. Returns 0 without touching the
    /// store when there is nothing to remove.
    async fn unwarn(&self, user_id: i64) -> Result<u32, LedgerError>;

    async fn warn_count(&self, user_id: i64) -> Result<u32, LedgerError>;

    /// Upsert the mute for a (chat, user) pair, overwriting any previous one.
    async fn record_mute(
        &self,
        chat_id: i64,
        user_id: i64,
        until: Option<DateTime<Utc>>,
        kind: MuteKind,
    ) -> Result<(), LedgerError>;

    /// Remove the mute for a pair. Returns whether a record existed.
    async fn clear_mute(&self, chat_id: i64, user_id: i64) -> Result<bool, LedgerError>;

    async fn find_mute(&self, chat_id: i64, user_id: i64)
        -> Result<Option<MuteRecord>, LedgerError>;

    /// Mutes of `kind` whose concrete expiry is at or before `now`.
    async fn find_expired_mutes(
        &self,
        now: DateTime<Utc>,
        kind: MuteKind,
    ) -> Result<Vec<MuteRecord>, LedgerError>;

    async fn log_action(
        &self,
        kind: ActionKind,
        chat_id: i64,
        user_id: i64,
        reason: &str,
    ) -> Result<ActionLogEntry, LedgerError>;

    async fn list_warns(&self) -> Result<Vec<WarnRecord>, LedgerError>;

    async fn list_mutes(&self) -> Result<Vec<MuteRecord>, LedgerError>;

    async fn list_actions(&self, kind: ActionKind) -> Result<Vec<ActionLogEntry>, LedgerError>;
}
