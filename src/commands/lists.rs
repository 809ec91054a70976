use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::commands::admin::{is_bot_admin, reply};
use crate::services::moderation::admin;

/// Everyone with a warning count on record
#[poise::command(prefix_command, check = "is_bot_admin")]
pub async fn warnlist(ctx: Context<'_>) -> Result<(), Error> {
    let notice = admin::warn_list(&ctx.data().core).await?;
    reply(ctx, notice).await
}

/// Active and pending mute records
#[poise::command(prefix_command, check = "is_bot_admin")]
pub async fn mutelist(ctx: Context<'_>) -> Result<(), Error> {
    let notice = admin::mute_list(&ctx.data().core).await?;
    reply(ctx, notice).await
}

#[poise::command(prefix_command, check = "is_bot_admin")]
pub async fn banlist(ctx: Context<'_>) -> Result<(), Error> {
    let notice = admin::ban_list(&ctx.data().core).await?;
    reply(ctx, notice).await
}

#[poise::command(prefix_command, check = "is_bot_admin")]
pub async fn kicklist(ctx: Context<'_>) -> Result<(), Error> {
    let notice = admin::kick_list(&ctx.data().core).await?;
    reply(ctx, notice).await
}
