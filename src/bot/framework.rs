use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, GatewayIntents};
use tracing::{error, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::commands;
use crate::config::Settings;
use crate::handlers::event_handler::event_handler;
use crate::services::gateway::{BoundedGateway, SerenityGateway};
use crate::services::ledger::PenaltyLedger;
use crate::services::moderation::{reconciler, ModerationCore};

pub async fn run(settings: Settings, ledger: Arc<dyn PenaltyLedger>) -> Result<(), Error> {
    let token = settings.discord_token.clone();
    let prefix = settings.command_prefix.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::admin::start(),
                commands::admin::ban(),
                commands::admin::unban(),
                commands::admin::kick(),
                commands::admin::mute(),
                commands::admin::unmute(),
                commands::admin::warn(),
                commands::admin::unwarn(),
                commands::lists::warnlist(),
                commands::lists::mutelist(),
                commands::lists::banlist(),
                commands::lists::kicklist(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            error!("Command {} failed: {:?}", ctx.command().name, error);
                            let _ = ctx.say(format!("Error: {}", error)).await;
                        }
                        poise::FrameworkError::ArgumentParse { error, ctx, .. } => {
                            let _ = ctx.say(format!("Invalid argument: {}", error)).await;
                        }
                        poise::FrameworkError::CommandCheckFailed { .. } => {
                            // Non-admins get no reply at all
                        }
                        poise::FrameworkError::UnknownCommand { .. } => {}
                        poise::FrameworkError::GuildOnly { .. } => {}
                        err => {
                            error!("Framework error: {:?}", err);
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, _framework| {
            Box::pin(async move {
                info!("Bot connected as {}", ready.user.name);

                let gateway = BoundedGateway::new(
                    SerenityGateway::new(ctx.http.clone(), ready.user.id.get()),
                    settings.gateway_timeout,
                );
                let core = Arc::new(ModerationCore::new(
                    ledger,
                    Arc::new(gateway),
                    settings.admin_ids.clone(),
                ));
                info!(
                    "Moderating with {} admins, Discord calls bounded to {:?}",
                    settings.admin_ids.len(),
                    settings.gateway_timeout
                );

                reconciler::spawn_reconciler(core.clone());

                Ok(Arc::new(Data::new(settings, core)))
            })
        })
        .build();

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .map_err(Error::Serenity)?;

    info!("Starting Discord client...");
    client.start().await.map_err(Error::Serenity)
}
