use chrono::Utc;
use tracing::debug;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::services::gateway::Notice;
use crate::services::moderation::admin;
use crate::utils::formatting::truncate;

/// Discord caps embed descriptions at 4096 characters
const MAX_REPLY_LEN: usize = 4096;

/// Commands are only available to configured administrators.
/// A failed check is swallowed by the error handler, so others get no reply.
pub async fn is_bot_admin(ctx: Context<'_>) -> Result<bool, Error> {
    let allowed = ctx.data().core.is_admin(ctx.author().id.get());
    if !allowed {
        debug!(
            "Ignoring {} from non-admin {}",
            ctx.command().name,
            ctx.author().id
        );
    }
    Ok(allowed)
}

/// Author of the message the command replied to
pub fn reply_target(ctx: Context<'_>) -> Option<u64> {
    match ctx {
        poise::Context::Prefix(prefix) => prefix
            .msg
            .referenced_message
            .as_ref()
            .map(|replied| replied.author.id.get()),
        poise::Context::Application(_) => None,
    }
}

pub async fn reply(ctx: Context<'_>, notice: Notice) -> Result<(), Error> {
    let notice = Notice {
        text: truncate(&notice.text, MAX_REPLY_LEN),
        ..notice
    };
    ctx.send(poise::CreateReply::default().embed(embeds::notice_embed(&notice)))
        .await?;
    Ok(())
}

/// Check that the bot is alive and start tracking this chat
#[poise::command(prefix_command)]
pub async fn start(ctx: Context<'_>) -> Result<(), Error> {
    let is_group = ctx.guild_id().is_some();
    let notice = admin::start(&ctx.data().core, ctx.channel_id().get(), is_group, Utc::now()).await;
    reply(ctx, notice).await
}

/// Ban the author of the replied-to message
#[poise::command(prefix_command, guild_only, check = "is_bot_admin")]
pub async fn ban(ctx: Context<'_>) -> Result<(), Error> {
    let notice = admin::ban(&ctx.data().core, ctx.channel_id().get(), reply_target(ctx)).await?;
    reply(ctx, notice).await
}

/// Lift a ban from the author of the replied-to message
#[poise::command(prefix_command, guild_only, check = "is_bot_admin")]
pub async fn unban(ctx: Context<'_>) -> Result<(), Error> {
    let notice = admin::unban(&ctx.data().core, ctx.channel_id().get(), reply_target(ctx)).await?;
    reply(ctx, notice).await
}

/// Remove the author of the replied-to message, letting them rejoin
#[poise::command(prefix_command, guild_only, check = "is_bot_admin")]
pub async fn kick(ctx: Context<'_>) -> Result<(), Error> {
    let notice = admin::kick(&ctx.data().core, ctx.channel_id().get(), reply_target(ctx)).await?;
    reply(ctx, notice).await
}

/// Mute the author of the replied-to message. `0` minutes mutes indefinitely.
#[poise::command(prefix_command, guild_only, check = "is_bot_admin")]
pub async fn mute(
    ctx: Context<'_>,
    #[description = "Duration in minutes"] minutes: Option<String>,
) -> Result<(), Error> {
    let notice = admin::mute(
        &ctx.data().core,
        ctx.channel_id().get(),
        reply_target(ctx),
        minutes.as_deref(),
        Utc::now(),
    )
    .await?;
    reply(ctx, notice).await
}

#[poise::command(prefix_command, guild_only, check = "is_bot_admin")]
pub async fn unmute(ctx: Context<'_>) -> Result<(), Error> {
    let notice = admin::unmute(&ctx.data().core, ctx.channel_id().get(), reply_target(ctx)).await?;
    reply(ctx, notice).await
}

#[poise::command(prefix_command, guild_only, check = "is_bot_admin")]
pub async fn warn(ctx: Context<'_>) -> Result<(), Error> {
    let notice = admin::warn(&ctx.data().core, reply_target(ctx)).await?;
    reply(ctx, notice).await
}

#[poise::command(prefix_command, guild_only, check = "is_bot_admin")]
pub async fn unwarn(ctx: Context<'_>) -> Result<(), Error> {
    let notice = admin::unwarn(&ctx.data().core, reply_target(ctx)).await?;
    reply(ctx, notice).await
}
