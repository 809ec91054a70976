use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{time_window, ModerationCore};
use crate::db::models::MuteKind;
use crate::services::gateway::{GatewayError, Notice};
use crate::utils::formatting::mention_user;

/// What a single reconciliation of one chat did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTransition {
    Locked,
    Unlocked,
    Unchanged,
}

/// Outcome of one loop cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub locked: usize,
    pub unlocked: usize,
    pub released: usize,
    /// Auto mutes whose hour is up
    pub lifted: usize,
    pub failures: usize,
}

impl CycleReport {
    pub fn changed(&self) -> bool {
        self.locked + self.unlocked + self.released + self.lifted > 0
    }
}

/// Time left until the next wall-clock minute boundary
pub fn duration_until_next_minute(now: DateTime<Utc>) -> Duration {
    const MINUTE: Duration = Duration::from_secs(60);

    // nanosecond() exceeds 1e9 during a leap second
    let into_minute = Duration::from_secs(now.second() as u64)
        + Duration::from_nanos(now.nanosecond().min(999_999_999) as u64);

    MINUTE
        .saturating_sub(into_minute)
        .max(Duration::from_millis(1))
}

/// Bring one chat's lock in line with the time window.
///
/// Holds the chat's lock flag for the whole compare-and-flip, and only flips
/// it once the gateway accepted the change. Unknown chats are left alone.
pub async fn reconcile_chat(
    core: &ModerationCore,
    chat_id: u64,
    now: DateTime<Utc>,
) -> Result<LockTransition, GatewayError> {
    let Some(state) = core.chats.lock_state(chat_id) else {
        return Ok(LockTransition::Unchanged);
    };
    let mut locked = state.lock().await;
    let desired = time_window::is_restricted(now);

    match (desired, *locked) {
        (true, false) => {
            core.enforcer().lock_chat(chat_id, &mut *locked).await?;
            Ok(LockTransition::Locked)
        }
        (false, true) => {
            core.enforcer().unlock_chat(chat_id, &mut *locked).await?;
            Ok(LockTransition::Unlocked)
        }
        _ => Ok(LockTransition::Unchanged),
    }
}

/// Release every manual mute whose expiry has passed.
/// Returns `(released, failures)`.
pub async fn release_expired_mutes(core: &ModerationCore, now: DateTime<Utc>) -> (usize, usize) {
    let expired = match core.ledger.find_expired_mutes(now, MuteKind::Manual).await {
        Ok(expired) => expired,
        Err(e) => {
            error!("Failed to query expired mutes: {:?}", e);
            return (0, 1);
        }
    };

    let mut released = 0;
    let mut failures = 0;

    for mute in expired {
        let chat_id = mute.chat_id as u64;
        let user_id = mute.user_id as u64;
        let enforcer = core.enforcer();

        match enforcer.unmute(chat_id, user_id).await {
            Ok(_) => {
                released += 1;
                enforcer
                    .notify(
                        chat_id,
                        Notice::success(format!(
                            "🔊 User {} was unmuted automatically.",
                            mention_user(user_id)
                        )),
                    )
                    .await;
            }
            Err(e) => {
                failures += 1;
                warn!(
                    "Failed to release expired mute of user {} in chat {}: {:?}",
                    user_id, chat_id, e
                );
            }
        }
    }

    (released, failures)
}

/// Lift auto mutes whose expiry has passed, without a notification.
/// Discord overwrites do not expire on their own, so this stands in for the
/// platform lifting the restriction. Returns `(lifted, failures)`.
pub async fn lift_lapsed_auto_mutes(core: &ModerationCore, now: DateTime<Utc>) -> (usize, usize) {
    let lapsed = match core.ledger.find_expired_mutes(now, MuteKind::Auto).await {
        Ok(lapsed) => lapsed,
        Err(e) => {
            error!("Failed to query lapsed auto mutes: {:?}", e);
            return (0, 1);
        }
    };

    let mut lifted = 0;
    let mut failures = 0;

    for mute in lapsed {
        let (chat_id, user_id) = (mute.chat_id as u64, mute.user_id as u64);
        match core.enforcer().unmute(chat_id, user_id).await {
            Ok(_) => lifted += 1,
            Err(e) => {
                failures += 1;
                warn!(
                    "Failed to lift lapsed auto mute of user {} in chat {}: {:?}",
                    user_id, chat_id, e
                );
            }
        }
    }

    (lifted, failures)
}

/// One pass over every known chat, then over expired mutes.
/// A failure for one chat or mute never stops the rest of the pass.
pub async fn run_cycle(core: &ModerationCore, now: DateTime<Utc>) -> CycleReport {
    let mut report = CycleReport::default();

    for chat_id in core.chats.known_chats() {
        match reconcile_chat(core, chat_id, now).await {
            Ok(LockTransition::Locked) => report.locked += 1,
            Ok(LockTransition::Unlocked) => report.unlocked += 1,
            Ok(LockTransition::Unchanged) => {}
            Err(e) => {
                report.failures += 1;
                warn!("Failed to reconcile lock of chat {}: {:?}", chat_id, e);
            }
        }
    }

    let (released, failures) = release_expired_mutes(core, now).await;
    report.released = released;
    report.failures += failures;

    let (lifted, failures) = lift_lapsed_auto_mutes(core, now).await;
    report.lifted = lifted;
    report.failures += failures;

    report
}

/// Start the reconciliation loop. It wakes on every minute boundary and
/// runs until the process exits.
pub fn spawn_reconciler(core: Arc<ModerationCore>) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Reconciliation loop started");

        loop {
            let report = run_cycle(&core, Utc::now()).await;
            if report.changed() || report.failures > 0 {
                info!(
                    "Reconciliation: locked {}, unlocked {}, released {}, lifted {}, failures {}",
                    report.locked,
                    report.unlocked,
                    report.released,
                    report.lifted,
                    report.failures
                );
            } else {
                debug!("Reconciliation: nothing to do");
            }

            tokio::time::sleep(duration_until_next_minute(Utc::now())).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, TimeZone};

    use super::*;
    use crate::services::gateway::testing::RecordingGateway;
    use crate::services::gateway::{BoundedGateway, ChatPermissions};
    use crate::services::ledger::{MemoryLedger, PenaltyLedger};
    use crate::services::moderation::test_support;

    /// 20:00 in the reference zone
    fn evening() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 17, 0, 0).unwrap()
    }

    /// 10:00 in the reference zone
    fn morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 2, 7, 0, 0).unwrap()
    }

    #[test]
    fn test_duration_until_next_minute() {
        let at = |s: u32, ms: u32| {
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, s).unwrap()
                + ChronoDuration::milliseconds(ms as i64)
        };
        assert_eq!(duration_until_next_minute(at(0, 0)), Duration::from_secs(60));
        assert_eq!(duration_until_next_minute(at(45, 0)), Duration::from_secs(15));
        assert_eq!(duration_until_next_minute(at(59, 500)), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_lock_reconciliation_is_idempotent() {
        let (core, gateway, _) = test_support::core();
        core.chats.observe(1, false);

        assert_eq!(reconcile_chat(&core, 1, evening()).await.unwrap(), LockTransition::Locked);
        assert_eq!(reconcile_chat(&core, 1, evening()).await.unwrap(), LockTransition::Unchanged);

        assert_eq!(gateway.chat_permission_calls(1).len(), 1);
        assert_eq!(gateway.sent_to(1).len(), 1);
        assert_eq!(core.chats.is_locked(1).await, Some(true));
    }

    #[tokio::test]
    async fn test_unlock_in_the_morning() {
        let (core, gateway, _) = test_support::core();
        core.chats.observe(1, true);

        let report = run_cycle(&core, morning()).await;
        assert_eq!(report.unlocked, 1);
        assert_eq!(gateway.chat_permission_calls(1), vec![ChatPermissions::open()]);

        let again = run_cycle(&core, morning()).await;
        assert_eq!(again, CycleReport::default());
    }

    #[tokio::test]
    async fn test_unknown_chat_is_untouched() {
        let (core, gateway, _) = test_support::core();
        assert_eq!(reconcile_chat(&core, 77, evening()).await.unwrap(), LockTransition::Unchanged);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failing_chat_does_not_block_others() {
        let (core, gateway, _) = test_support::core();
        for id in [1, 2, 3] {
            core.chats.observe(id, false);
        }
        gateway.fail_chat(2);

        let report = run_cycle(&core, evening()).await;
        assert_eq!(report.locked, 2);
        assert_eq!(report.failures, 1);
        assert_eq!(core.chats.is_locked(2).await, Some(false));

        // the failed chat converges on the next cycle
        gateway.heal_chat(2);
        let retry = run_cycle(&core, evening()).await;
        assert_eq!(retry.locked, 1);
        assert_eq!(core.chats.is_locked(2).await, Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_chat_is_bounded() {
        let recorder = Arc::new(RecordingGateway::new());
        recorder.hang_chat(1);
        let gateway = Arc::new(BoundedGateway::new(recorder.clone(), std::time::Duration::from_secs(5)));
        let core = ModerationCore::new(Arc::new(MemoryLedger::new()), gateway, vec![]);
        core.chats.observe(1, false);
        core.chats.observe(2, false);

        let report = run_cycle(&core, evening()).await;
        assert_eq!(report.failures, 1);
        assert_eq!(report.locked, 1);
        assert_eq!(recorder.chat_permission_calls(2).len(), 1);
    }

    #[tokio::test]
    async fn test_expired_manual_mutes_are_released() {
        let (core, gateway, ledger) = test_support::core();
        let until = morning();
        ledger.record_mute(5, 50, Some(until), MuteKind::Manual).await.unwrap();
        ledger.record_mute(5, 52, None, MuteKind::Manual).await.unwrap();

        let early = run_cycle(&core, until - ChronoDuration::seconds(1)).await;
        assert_eq!(early.released, 0);

        let due = run_cycle(&core, until).await;
        assert_eq!(due.released, 1);
        assert_eq!(gateway.restrictions_of(5, 50), vec![(ChatPermissions::open(), None)]);
        assert_eq!(gateway.sent_to(5), vec!["🔊 User <@50> was unmuted automatically.".to_string()]);

        let remaining: Vec<i64> = ledger
            .list_mutes()
            .await
            .unwrap()
            .iter()
            .map(|m| m.user_id)
            .collect();
        assert_eq!(remaining, vec![52]);

        let later = run_cycle(&core, until + ChronoDuration::minutes(1)).await;
        assert_eq!(later.released, 0);
    }

    #[tokio::test]
    async fn test_lapsed_auto_mute_is_lifted_silently() {
        let (core, gateway, ledger) = test_support::core();
        let until = morning();
        ledger.record_mute(5, 51, Some(until), MuteKind::Auto).await.unwrap();

        let early = run_cycle(&core, until - ChronoDuration::seconds(1)).await;
        assert_eq!(early.lifted, 0);
        assert!(gateway.calls().is_empty());

        let due = run_cycle(&core, until).await;
        assert_eq!(due.lifted, 1);
        assert_eq!(due.released, 0);
        assert_eq!(gateway.restrictions_of(5, 51), vec![(ChatPermissions::open(), None)]);
        assert!(gateway.sent_to(5).is_empty());
        assert!(ledger.find_mute(5, 51).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mutes_in_sibling_chats_are_independent() {
        let (core, gateway, ledger) = test_support::core();
        let user = 70;
        let short = morning();
        let long = morning() + ChronoDuration::hours(1);

        core.enforcer().mute(1, user, Some(long), MuteKind::Auto).await.unwrap();
        core.enforcer().mute(2, user, Some(short), MuteKind::Manual).await.unwrap();

        let report = run_cycle(&core, short).await;
        assert_eq!(report.released, 1);
        assert_eq!(report.lifted, 0);

        // chat 1 still holds only its own restriction
        assert_eq!(
            gateway.restrictions_of(1, user),
            vec![(ChatPermissions::restricted(), Some(long))]
        );
        assert_eq!(
            gateway.restrictions_of(2, user).last(),
            Some(&(ChatPermissions::open(), None))
        );
        assert!(ledger.find_mute(1, user as i64).await.unwrap().is_some());
        assert!(ledger.find_mute(2, user as i64).await.unwrap().is_none());

        let later = run_cycle(&core, long).await;
        assert_eq!(later.lifted, 1);
        assert!(ledger.list_mutes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_release_failure_keeps_record_for_retry() {
        let (core, gateway, ledger) = test_support::core();
        let until = morning();
        ledger.record_mute(5, 50, Some(until), MuteKind::Manual).await.unwrap();
        ledger.record_mute(6, 60, Some(until), MuteKind::Manual).await.unwrap();
        gateway.fail_chat(5);

        let report = run_cycle(&core, until).await;
        assert_eq!(report.released, 1);
        assert_eq!(report.failures, 1);
        assert!(ledger.find_mute(5, 50).await.unwrap().is_some());
        assert!(ledger.find_mute(6, 60).await.unwrap().is_none());
    }
}
