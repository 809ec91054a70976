use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use super::{LedgerError, PenaltyLedger};
use crate::db::models::{ActionKind, ActionLogEntry, MuteKind, MuteRecord, WarnRecord};

#[derive(Debug, Default)]
struct Tables {
    warns: Vec<WarnRecord>,
    mutes: Vec<MuteRecord>,
    bans: Vec<ActionLogEntry>,
    kicks: Vec<ActionLogEntry>,
}

impl Tables {
    fn actions(&self, kind: ActionKind) -> &Vec<ActionLogEntry> {
        match kind {
            ActionKind::Ban => &self.bans,
            ActionKind::Kick => &self.kicks,
        }
    }

    fn actions_mut(&mut self, kind: ActionKind) -> &mut Vec<ActionLogEntry> {
        match kind {
            ActionKind::Ban => &mut self.bans,
            ActionKind::Kick => &mut self.kicks,
        }
    }
}

/// In-process ledger used when no database is configured.
/// Records keep insertion order; an upserted mute keeps its original slot.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    tables: Mutex<Tables>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PenaltyLedger for MemoryLedger {
    async fn warn(&self, user_id: i64) -> Result<u32, LedgerError> {
        let mut tables = self.tables.lock();
        let now = Utc::now();

        if let Some(record) = tables.warns.iter_mut().find(|w| w.user_id == user_id) {
            record.warn_count += 1;
            record.updated_at = now;
            return Ok(record.warn_count as u32);
        }

        tables.warns.push(WarnRecord {
            user_id,
            warn_count: 1,
            created_at: now,
            updated_at: now,
        });
        Ok(1)
    }

    async fn unwarn(&self, user_id: i64) -> Result<u32, LedgerError> {
        let mut tables = self.tables.lock();

        match tables.warns.iter_mut().find(|w| w.user_id == user_id) {
            Some(record) if record.warn_count > 0 => {
                record.warn_count -= 1;
                record.updated_at = Utc::now();
                Ok(record.warn_count as u32)
            }
            _ => Ok(0),
        }
    }

    async fn warn_count(&self, user_id: i64) -> Result<u32, LedgerError> {
        let tables = self.tables.lock();
        Ok(tables
            .warns
            .iter()
            .find(|w| w.user_id == user_id)
            .map(|w| w.warn_count.max(0) as u32)
            .unwrap_or(0))
    }

    async fn record_mute(
        &self,
        chat_id: i64,
        user_id: i64,
        until: Option<DateTime<Utc>>,
        kind: MuteKind,
    ) -> Result<(), LedgerError> {
        let mut tables = self.tables.lock();
        let record = MuteRecord {
            chat_id,
            user_id,
            until,
            kind,
        };

        match tables
            .mutes
            .iter_mut()
            .find(|m| m.chat_id == chat_id && m.user_id == user_id)
        {
            Some(existing) => *existing = record,
            None => tables.mutes.push(record),
        }
        Ok(())
    }

    async fn clear_mute(&self, chat_id: i64, user_id: i64) -> Result<bool, LedgerError> {
        let mut tables = self.tables.lock();
        let before = tables.mutes.len();
        tables
            .mutes
            .retain(|m| !(m.chat_id == chat_id && m.user_id == user_id));
        Ok(tables.mutes.len() < before)
    }

    async fn find_mute(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<Option<MuteRecord>, LedgerError> {
        let tables = self.tables.lock();
        Ok(tables
            .mutes
            .iter()
            .find(|m| m.chat_id == chat_id && m.user_id == user_id)
            .cloned())
    }

    async fn find_expired_mutes(
        &self,
        now: DateTime<Utc>,
        kind: MuteKind,
    ) -> Result<Vec<MuteRecord>, LedgerError> {
        let tables = self.tables.lock();
        Ok(tables
            .mutes
            .iter()
            .filter(|m| m.kind == kind && m.is_expired(now))
            .cloned()
            .collect())
    }

    async fn log_action(
        &self,
        kind: ActionKind,
        chat_id: i64,
        user_id: i64,
        reason: &str,
    ) -> Result<ActionLogEntry, LedgerError> {
        let entry = ActionLogEntry {
            id: Uuid::new_v4(),
            chat_id,
            user_id,
            reason: reason.to_string(),
            logged_at: Utc::now(),
        };
        self.tables.lock().actions_mut(kind).push(entry.clone());
        Ok(entry)
    }

    async fn list_warns(&self) -> Result<Vec<WarnRecord>, LedgerError> {
        Ok(self.tables.lock().warns.clone())
    }

    async fn list_mutes(&self) -> Result<Vec<MuteRecord>, LedgerError> {
        Ok(self.tables.lock().mutes.clone())
    }

    async fn list_actions(&self, kind: ActionKind) -> Result<Vec<ActionLogEntry>, LedgerError> {
        Ok(self.tables.lock().actions(kind).clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use tokio_test::assert_ok;

    use super::*;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, hour, min, 0).unwrap()
    }

    #[tokio::test]
    async fn test_warn_then_unwarn_restores_count() {
        let ledger = MemoryLedger::new();
        assert_eq!(ledger.warn(7).await.unwrap(), 1);
        assert_eq!(ledger.warn(7).await.unwrap(), 2);

        let before = ledger.warn_count(7).await.unwrap();
        ledger.warn(7).await.unwrap();
        assert_eq!(ledger.unwarn(7).await.unwrap(), before);
        assert_eq!(ledger.warn_count(7).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_unwarn_without_record_leaves_store_untouched() {
        let ledger = MemoryLedger::new();

        assert_eq!(ledger.unwarn(42).await.unwrap(), 0);
        assert!(ledger.list_warns().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unwarn_is_floored_at_zero() {
        let ledger = MemoryLedger::new();
        ledger.warn(3).await.unwrap();

        assert_eq!(ledger.unwarn(3).await.unwrap(), 0);
        assert_eq!(ledger.unwarn(3).await.unwrap(), 0);

        let warns = ledger.list_warns().await.unwrap();
        assert_eq!(warns.len(), 1);
        assert_eq!(warns[0].warn_count, 0);
    }

    #[tokio::test]
    async fn test_warns_are_global_per_user() {
        let ledger = MemoryLedger::new();
        ledger.warn(1).await.unwrap();
        ledger.warn(2).await.unwrap();
        ledger.warn(1).await.unwrap();

        let warns = ledger.list_warns().await.unwrap();
        let listed: Vec<(i64, i32)> = warns.iter().map(|w| (w.user_id, w.warn_count)).collect();
        assert_eq!(listed, vec![(1, 2), (2, 1)]);
    }

    #[tokio::test]
    async fn test_record_mute_overwrites_previous_mute() {
        let ledger = MemoryLedger::new();
        assert_ok!(ledger.record_mute(10, 5, Some(at(12, 0)), MuteKind::Auto).await);
        assert_ok!(ledger.record_mute(10, 6, None, MuteKind::Manual).await);
        assert_ok!(ledger.record_mute(10, 5, None, MuteKind::Manual).await);

        let mutes = ledger.list_mutes().await.unwrap();
        assert_eq!(mutes.len(), 2);
        assert_eq!(mutes[0].user_id, 5);
        assert_eq!(mutes[0].until, None);
        assert_eq!(mutes[0].kind, MuteKind::Manual);
    }

    #[tokio::test]
    async fn test_mutes_are_keyed_per_chat() {
        let ledger = MemoryLedger::new();
        ledger.record_mute(1, 5, None, MuteKind::Manual).await.unwrap();
        ledger.record_mute(2, 5, None, MuteKind::Manual).await.unwrap();

        assert!(ledger.clear_mute(1, 5).await.unwrap());
        assert!(!ledger.clear_mute(1, 5).await.unwrap());
        assert!(ledger.find_mute(2, 5).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expired_scan_respects_boundary_and_kind() {
        let ledger = MemoryLedger::new();
        let until = at(12, 30);
        ledger.record_mute(1, 1, Some(until), MuteKind::Manual).await.unwrap();
        ledger.record_mute(1, 2, Some(until), MuteKind::Auto).await.unwrap();
        ledger.record_mute(1, 3, None, MuteKind::Manual).await.unwrap();

        let early = ledger
            .find_expired_mutes(until - Duration::seconds(1), MuteKind::Manual)
            .await
            .unwrap();
        assert!(early.is_empty());

        let due = ledger.find_expired_mutes(until, MuteKind::Manual).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].user_id, 1);

        let much_later = ledger
            .find_expired_mutes(until + Duration::days(30), MuteKind::Manual)
            .await
            .unwrap();
        assert_eq!(much_later.len(), 1);

        ledger.clear_mute(1, 1).await.unwrap();
        let after_release = ledger.find_expired_mutes(until, MuteKind::Manual).await.unwrap();
        assert!(after_release.is_empty());
    }

    #[tokio::test]
    async fn test_action_logs_keep_insertion_order() {
        let ledger = MemoryLedger::new();
        ledger.log_action(ActionKind::Ban, 1, 9, "").await.unwrap();
        ledger.log_action(ActionKind::Kick, 1, 8, "").await.unwrap();
        ledger.log_action(ActionKind::Ban, 1, 7, "spam").await.unwrap();

        let bans = ledger.list_actions(ActionKind::Ban).await.unwrap();
        assert_eq!(bans.iter().map(|b| b.user_id).collect::<Vec<_>>(), vec![9, 7]);
        assert_eq!(bans[1].reason, "spam");
        assert_eq!(ledger.list_actions(ActionKind::Kick).await.unwrap().len(), 1);
    }
}
