//! Administrator actions behind the chat commands.
//!
//! Every action targets the author of the replied-to message and answers with
//! a notice for the chat. Transport failures become an error notice; store
//! failures are returned to the caller.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{info, warn};

use super::{reconciler, ModerationCore};
use crate::bot::error::Error;
use crate::constants::policy::WARN_THRESHOLD;
use crate::constants::timeouts::DEFAULT_MUTE_MINUTES;
use crate::db::models::{ActionKind, MuteKind};
use crate::services::gateway::Notice;
use crate::utils::formatting::{action_line, listing, mute_line, warn_line};

fn missing_target() -> Notice {
    Notice::error("Reply to the user's message.")
}

/// Turn a transport failure into a reply, pass store failures through
fn failure_notice(action: &str, error: Error) -> Result<Notice, Error> {
    if error.is_gateway() {
        warn!("Failed to {}: {:?}", action, error);
        Ok(Notice::error(format!("❌ Failed to {}: {}", action, error)))
    } else {
        Err(error)
    }
}

/// Minutes requested by `mute`. Only a plain digit string counts; anything
/// else falls back to the default. `0` requests an indefinite mute.
/// `None` for a digit string too large to be a number of minutes.
pub fn parse_mute_minutes(arg: Option<&str>) -> Option<i64> {
    match arg {
        Some(raw) if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) => raw.parse().ok(),
        _ => Some(DEFAULT_MUTE_MINUTES),
    }
}

/// Expiry of a timed mute of `minutes`, `None` when it is out of range
pub fn mute_expiry(now: DateTime<Utc>, minutes: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_minutes(minutes).and_then(|delta| now.checked_add_signed(delta))
}

fn duration_too_long() -> Notice {
    Notice::error("❌ Mute duration is too long.")
}

/// Register the chat and bring its lock in line right away
pub async fn start(
    core: &ModerationCore,
    chat_id: u64,
    is_group: bool,
    now: DateTime<Utc>,
) -> Notice {
    if is_group {
        // An unseen chat is assumed open, so a start during the lock window locks it
        if core.chats.observe(chat_id, false) {
            info!("Tracking new chat {} after start", chat_id);
        }
        if let Err(e) = reconciler::reconcile_chat(core, chat_id, now).await {
            warn!("Failed to reconcile chat {} on start: {:?}", chat_id, e);
        }
    }

    Notice::success("✅ Bot is running and ready.")
}

pub async fn ban(core: &ModerationCore, chat_id: u64, target: Option<u64>) -> Result<Notice, Error> {
    let Some(user_id) = target else {
        return Ok(missing_target());
    };

    if let Err(e) = core.gateway.ban_member(chat_id, user_id).await {
        return failure_notice("ban", e.into());
    }
    core.ledger
        .log_action(ActionKind::Ban, chat_id as i64, user_id as i64, "")
        .await?;

    info!("Banned user {} in chat {}", user_id, chat_id);
    Ok(Notice::error("🚫 User banned."))
}

pub async fn unban(core: &ModerationCore, chat_id: u64, target: Option<u64>) -> Result<Notice, Error> {
    let Some(user_id) = target else {
        return Ok(missing_target());
    };

    if let Err(e) = core.gateway.unban_member(chat_id, user_id).await {
        return failure_notice("unban", e.into());
    }

    info!("Unbanned user {} in chat {}", user_id, chat_id);
    Ok(Notice::success("✅ User unbanned."))
}

/// Remove a member without keeping them out: ban, then unban
pub async fn kick(core: &ModerationCore, chat_id: u64, target: Option<u64>) -> Result<Notice, Error> {
    let Some(user_id) = target else {
        return Ok(missing_target());
    };

    if let Err(e) = core.gateway.ban_member(chat_id, user_id).await {
        return failure_notice("kick", e.into());
    }
    if let Err(e) = core.gateway.unban_member(chat_id, user_id).await {
        return failure_notice("kick", e.into());
    }
    core.ledger
        .log_action(ActionKind::Kick, chat_id as i64, user_id as i64, "")
        .await?;

    info!("Kicked user {} from chat {}", user_id, chat_id);
    Ok(Notice::warning("👢 User kicked."))
}

pub async fn mute(
    core: &ModerationCore,
    chat_id: u64,
    target: Option<u64>,
    minutes_arg: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Notice, Error> {
    let Some(user_id) = target else {
        return Ok(missing_target());
    };

    let Some(minutes) = parse_mute_minutes(minutes_arg) else {
        return Ok(duration_too_long());
    };
    let until = if minutes == 0 {
        None
    } else {
        match mute_expiry(now, minutes) {
            Some(until) => Some(until),
            None => return Ok(duration_too_long()),
        }
    };

    if let Err(e) = core
        .enforcer()
        .mute(chat_id, user_id, until, MuteKind::Manual)
        .await
    {
        return failure_notice("mute", e);
    }

    Ok(match until {
        Some(_) => Notice::warning(format!("🔇 User muted for {} min.", minutes)),
        None => Notice::warning("🔇 User muted indefinitely."),
    })
}

pub async fn unmute(core: &ModerationCore, chat_id: u64, target: Option<u64>) -> Result<Notice, Error> {
    let Some(user_id) = target else {
        return Ok(missing_target());
    };

    if let Err(e) = core.enforcer().unmute(chat_id, user_id).await {
        return failure_notice("unmute", e);
    }

    Ok(Notice::success("🔊 User unmuted."))
}

/// Manual warning. Unlike link violations this never escalates to a mute.
pub async fn warn(core: &ModerationCore, target: Option<u64>) -> Result<Notice, Error> {
    let Some(user_id) = target else {
        return Ok(missing_target());
    };

    let warns = core.ledger.warn(user_id as i64).await?;
    Ok(Notice::warning(format!(
        "⚠️ Warning issued. Current: {}/{}.",
        warns, WARN_THRESHOLD
    )))
}

pub async fn unwarn(core: &ModerationCore, target: Option<u64>) -> Result<Notice, Error> {
    let Some(user_id) = target else {
        return Ok(missing_target());
    };

    let left = core.ledger.unwarn(user_id as i64).await?;
    Ok(Notice::success(format!(
        "✅ Warning removed. Remaining: {}/{}.",
        left, WARN_THRESHOLD
    )))
}

pub async fn warn_list(core: &ModerationCore) -> Result<Notice, Error> {
    let warns = core.ledger.list_warns().await?;
    Ok(Notice::info(listing("📋 Warnings:", "No warnings.", &warns, warn_line)))
}

pub async fn mute_list(core: &ModerationCore) -> Result<Notice, Error> {
    let mutes = core.ledger.list_mutes().await?;
    Ok(Notice::info(listing("🔇 Mutes:", "Nobody is muted.", &mutes, mute_line)))
}

pub async fn ban_list(core: &ModerationCore) -> Result<Notice, Error> {
    let bans = core.ledger.list_actions(ActionKind::Ban).await?;
    Ok(Notice::info(listing("🚫 Bans:", "No bans.", &bans, action_line)))
}

pub async fn kick_list(core: &ModerationCore) -> Result<Notice, Error> {
    let kicks = core.ledger.list_actions(ActionKind::Kick).await?;
    Ok(Notice::info(listing("👢 Kicks:", "No kicks.", &kicks, action_line)))
}
