use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{LedgerError, PenaltyLedger};
use crate::db::models::{ActionKind, ActionLogEntry, MuteKind, MuteRecord, WarnRecord};
use crate::db::queries::{action_log, mute, warn};

/// Ledger backed by PostgreSQL. Every operation is a single statement.
#[derive(Debug, Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_count(raw: i32) -> u32 {
    raw.max(0) as u32
}

#[async_trait]
impl PenaltyLedger for PgLedger {
    async fn warn(&self, user_id: i64) -> Result<u32, LedgerError> {
        Ok(to_count(warn::increment(&self.pool, user_id).await?))
    }

    async fn unwarn(&self, user_id: i64) -> Result<u32, LedgerError> {
        Ok(to_count(warn::decrement(&self.pool, user_id).await?))
    }

    async fn warn_count(&self, user_id: i64) -> Result<u32, LedgerError> {
        Ok(to_count(warn::get_count(&self.pool, user_id).await?))
    }

    async fn record_mute(
        &self,
        chat_id: i64,
        user_id: i64,
        until: Option<DateTime<Utc>>,
        kind: MuteKind,
    ) -> Result<(), LedgerError> {
        mute::upsert(&self.pool, chat_id, user_id, until, kind).await?;
        Ok(())
    }

    async fn clear_mute(&self, chat_id: i64, user_id: i64) -> Result<bool, LedgerError> {
        Ok(mute::remove(&self.pool, chat_id, user_id).await?)
    }

    async fn find_mute(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<Option<MuteRecord>, LedgerError> {
        Ok(mute::get(&self.pool, chat_id, user_id).await?)
    }

    async fn find_expired_mutes(
        &self,
        now: DateTime<Utc>,
        kind: MuteKind,
    ) -> Result<Vec<MuteRecord>, LedgerError> {
        Ok(mute::find_expired(&self.pool, now, kind).await?)
    }

    async fn log_action(
        &self,
        kind: ActionKind,
        chat_id: i64,
        user_id: i64,
        reason: &str,
    ) -> Result<ActionLogEntry, LedgerError> {
        Ok(action_log::create(&self.pool, kind, chat_id, user_id, reason).await?)
    }

    async fn list_warns(&self) -> Result<Vec<WarnRecord>, LedgerError> {
        Ok(warn::list_all(&self.pool).await?)
    }

    async fn list_mutes(&self) -> Result<Vec<MuteRecord>, LedgerError> {
        Ok(mute::list_all(&self.pool).await?)
    }

    async fn list_actions(&self, kind: ActionKind) -> Result<Vec<ActionLogEntry>, LedgerError> {
        Ok(action_log::list_all(&self.pool, kind).await?)
    }
}
