use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::bot::error::Error;
use crate::db::models::MuteKind;
use crate::services::gateway::{ChatPermissions, Gateway, GatewayError, Notice};
use crate::services::ledger::PenaltyLedger;

/// Turns restriction intents into gateway calls and mute records.
/// Holds no policy of its own.
pub struct RestrictionEnforcer<'a> {
    gateway: &'a dyn Gateway,
    ledger: &'a dyn PenaltyLedger,
}

impl<'a> RestrictionEnforcer<'a> {
    pub fn new(gateway: &'a dyn Gateway, ledger: &'a dyn PenaltyLedger) -> Self {
        Self { gateway, ledger }
    }

    /// Deny all content to one member, optionally until `until`
    pub async fn apply_restricted(
        &self,
        chat_id: u64,
        user_id: u64,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), GatewayError> {
        self.gateway
            .restrict_member(chat_id, user_id, &ChatPermissions::restricted(), until)
            .await?;
        debug!("Restricted user {} in chat {} until {:?}", user_id, chat_id, until);
        Ok(())
    }

    /// Give one member the open bundle back
    pub async fn apply_unrestricted(&self, chat_id: u64, user_id: u64) -> Result<(), GatewayError> {
        self.gateway
            .restrict_member(chat_id, user_id, &ChatPermissions::open(), None)
            .await?;
        debug!("Unrestricted user {} in chat {}", user_id, chat_id);
        Ok(())
    }

    /// Lock the whole chat and flip its tracked flag on success.
    /// A failed notification does not undo the lock.
    pub async fn lock_chat(&self, chat_id: u64, locked: &mut bool) -> Result<(), GatewayError> {
        self.gateway
            .set_chat_permissions(chat_id, &ChatPermissions::restricted())
            .await?;
        *locked = true;
        info!("Locked chat {}", chat_id);

        self.notify(chat_id, Notice::info("🔒 Chat is closed from 17:00 to 06:00 MSK."))
            .await;
        Ok(())
    }

    /// Unlock the whole chat and flip its tracked flag on success
    pub async fn unlock_chat(&self, chat_id: u64, locked: &mut bool) -> Result<(), GatewayError> {
        self.gateway
            .set_chat_permissions(chat_id, &ChatPermissions::open())
            .await?;
        *locked = false;
        info!("Unlocked chat {}", chat_id);

        self.notify(chat_id, Notice::success("🔓 Chat is open. Good morning!"))
            .await;
        Ok(())
    }

    /// Restrict a member, then record the mute. Nothing is recorded if the
    /// restriction fails.
    pub async fn mute(
        &self,
        chat_id: u64,
        user_id: u64,
        until: Option<DateTime<Utc>>,
        kind: MuteKind,
    ) -> Result<(), Error> {
        self.apply_restricted(chat_id, user_id, until).await?;
        self.ledger
            .record_mute(chat_id as i64, user_id as i64, until, kind)
            .await?;

        info!(
            "Muted user {} in chat {} ({}, until {:?})",
            user_id, chat_id, kind, until
        );
        Ok(())
    }

    /// Lift a member's restriction, then drop the mute record.
    /// Returns whether a record existed.
    pub async fn unmute(&self, chat_id: u64, user_id: u64) -> Result<bool, Error> {
        self.apply_unrestricted(chat_id, user_id).await?;
        let had_mute = self
            .ledger
            .clear_mute(chat_id as i64, user_id as i64)
            .await?;

        info!("Unmuted user {} in chat {}", user_id, chat_id);
        Ok(had_mute)
    }

    /// Post a notification, logging instead of failing
    pub async fn notify(&self, chat_id: u64, notice: Notice) {
        if let Err(e) = self.gateway.send_message(chat_id, &notice).await {
            warn!("Failed to notify chat {}: {:?}", chat_id, e);
        }
    }
}
