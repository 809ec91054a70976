use std::sync::Arc;

use chrono::Utc;
use poise::serenity_prelude::Message;
use tracing::debug;

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::services::moderation::message_policy::{self, InboundMessage, Verdict};

/// Transport-independent view of a Discord message.
///
/// Returns `None` for messages from other bots. Webhook posts are kept: that is
/// how a channel identity shows up in a text channel.
pub fn to_inbound(message: &Message) -> Option<InboundMessage> {
    let from_channel_identity = message.webhook_id.is_some();
    if message.author.bot && !from_channel_identity {
        return None;
    }

    Some(InboundMessage {
        chat_id: message.channel_id.get(),
        message_id: message.id.get(),
        sender_id: message.author.id.get(),
        from_channel_identity,
        text: Some(message.content.clone()).filter(|text| !text.is_empty()),
        is_group: message.guild_id.is_some(),
    })
}

pub async fn handle_message(data: &Arc<Data>, message: &Message) -> Result<(), Error> {
    let Some(inbound) = to_inbound(message) else {
        return Ok(());
    };

    let verdict = message_policy::inspect_message(&data.core, &inbound, Utc::now()).await?;
    if verdict != Verdict::Clean && verdict != Verdict::Ignored {
        debug!("Message {} in {}: {:?}", inbound.message_id, inbound.chat_id, verdict);
    }

    Ok(())
}
