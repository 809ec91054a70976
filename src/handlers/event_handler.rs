use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, FullEvent};
use tracing::{debug, error, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::handlers::message;

pub async fn event_handler(
    _ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Arc<Data>, Error>,
    data: &Arc<Data>,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot, .. } => {
            info!("Bot ready as {}", data_about_bot.user.name);
        }

        FullEvent::Message { new_message } => {
            // Commands reach the framework separately; they still pass the link check
            if let Err(e) = message::handle_message(data, new_message).await {
                error!("Message handler error: {:?}", e);
            }
        }

        FullEvent::ChannelDelete { channel, .. } => {
            if data.core.chats.forget(channel.id.get()) {
                info!("Stopped tracking deleted channel {}", channel.id);
            }
        }

        // An unavailable guild is an outage, its channels come back
        FullEvent::GuildDelete { incomplete, full } if !incomplete.unavailable => {
            match full {
                Some(guild) => {
                    let forgotten = guild
                        .channels
                        .keys()
                        .filter(|id| data.core.chats.forget(id.get()))
                        .count();
                    info!(
                        "Left guild {}, stopped tracking {} chats",
                        incomplete.id, forgotten
                    );
                }
                None => debug!("Left uncached guild {}", incomplete.id),
            }
        }

        _ => {}
    }

    Ok(())
}
