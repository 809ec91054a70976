use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{time_window, ModerationCore};
use crate::bot::error::Error;
use crate::constants::policy::{ALLOWED_LINKS, WARN_THRESHOLD};
use crate::constants::timeouts::{format_duration, AUTO_MUTE_DURATION};
use crate::db::models::MuteKind;
use crate::services::gateway::Notice;
use crate::utils::links::contains_bad_link;

/// Transport-independent view of an inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: u64,
    pub message_id: u64,
    pub sender_id: u64,
    /// Posted under a channel identity rather than by a real user
    pub from_channel_identity: bool,
    /// `None` for content without text (attachments, stickers...)
    pub text: Option<String>,
    /// Sent in a group chat rather than a direct conversation
    pub is_group: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Not a group message
    Ignored,
    /// Nothing to do
    Clean,
    ChannelPostRemoved,
    LinkRemoved { warns: u32, auto_muted: bool },
    /// A violation was found but the message could not be deleted
    RemovalFailed,
}

/// Inspect one inbound message and act on violations.
///
/// Gateway failures are logged and never returned. Store failures are.
pub async fn inspect_message(
    core: &ModerationCore,
    message: &InboundMessage,
    now: DateTime<Utc>,
) -> Result<Verdict, Error> {
    if !message.is_group {
        return Ok(Verdict::Ignored);
    }

    let chat_id = message.chat_id;
    if core.chats.observe(chat_id, time_window::is_restricted(now)) {
        info!("Tracking new chat {}", chat_id);
    }

    if core.is_admin(message.sender_id) {
        return Ok(Verdict::Clean);
    }

    if message.from_channel_identity {
        return Ok(remove_channel_post(core, message).await);
    }

    let has_bad_link = message.text.as_deref().is_some_and(contains_bad_link);
    if has_bad_link {
        return remove_bad_link(core, message, now).await;
    }

    Ok(Verdict::Clean)
}

async fn remove_channel_post(core: &ModerationCore, message: &InboundMessage) -> Verdict {
    let enforcer = core.enforcer();

    if let Err(e) = core
        .gateway
        .delete_message(message.chat_id, message.message_id)
        .await
    {
        warn!(
            "Failed to delete channel post {} in chat {}: {:?}",
            message.message_id, message.chat_id, e
        );
        return Verdict::RemovalFailed;
    }

    enforcer
        .notify(
            message.chat_id,
            Notice::error("🚫 Posting on behalf of a channel is not allowed."),
        )
        .await;

    Verdict::ChannelPostRemoved
}

async fn remove_bad_link(
    core: &ModerationCore,
    message: &InboundMessage,
    now: DateTime<Utc>,
) -> Result<Verdict, Error> {
    let chat_id = message.chat_id;
    let user_id = message.sender_id;
    let enforcer = core.enforcer();

    // A message we could not remove earns no warning
    if let Err(e) = core.gateway.delete_message(chat_id, message.message_id).await {
        warn!(
            "Failed to delete message {} with a forbidden link in chat {}: {:?}",
            message.message_id, chat_id, e
        );
        return Ok(Verdict::RemovalFailed);
    }

    let warns = core.ledger.warn(user_id as i64).await?;
    info!(
        "User {} warned for a forbidden link in chat {} ({}/{})",
        user_id, chat_id, warns, WARN_THRESHOLD
    );

    enforcer
        .notify(
            chat_id,
            Notice::warning(format!(
                "🔗 Only these links are allowed:\n{}",
                ALLOWED_LINKS.join("\n")
            )),
        )
        .await;

    if warns < WARN_THRESHOLD {
        return Ok(Verdict::LinkRemoved {
            warns,
            auto_muted: false,
        });
    }

    let already_muted = core
        .ledger
        .find_mute(chat_id as i64, user_id as i64)
        .await?
        .is_some_and(|mute| mute.is_active(now));
    if already_muted {
        return Ok(Verdict::LinkRemoved {
            warns,
            auto_muted: false,
        });
    }

    let until = now
        + chrono::Duration::from_std(AUTO_MUTE_DURATION).unwrap_or(chrono::Duration::hours(1));
    let auto_muted = match enforcer.mute(chat_id, user_id, Some(until), MuteKind::Auto).await {
        Ok(()) => {
            enforcer
                .notify(
                    chat_id,
                    Notice::error(format!(
                        "🔇 User muted for {} for reaching {} warnings.",
                        format_duration(AUTO_MUTE_DURATION),
                        WARN_THRESHOLD
                    )),
                )
                .await;
            true
        }
        Err(e) if e.is_gateway() => {
            warn!("Failed to auto-mute user {} in chat {}: {:?}", user_id, chat_id, e);
            false
        }
        Err(e) => return Err(e),
    };

    Ok(Verdict::LinkRemoved { warns, auto_muted })
}
