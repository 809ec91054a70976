use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::all::{
    ChannelId, CreateMessage, GuildChannel, GuildId, Http, MessageId, PermissionOverwrite,
    PermissionOverwriteType, Permissions, RoleId, UserId,
};
use serenity::http::HttpError;
use tracing::debug;

use super::{ChatPermissions, Gateway, GatewayError, Notice};
use crate::constants::embeds;
use crate::utils::permissions::{bot_channel_permissions, denied_bits, merge_chat_overwrite};

/// Channel overwrite that applies a member restriction
fn member_overwrite(user_id: UserId, permissions: &ChatPermissions) -> PermissionOverwrite {
    PermissionOverwrite {
        allow: Permissions::empty(),
        deny: denied_bits(permissions),
        kind: PermissionOverwriteType::Member(user_id),
    }
}

/// Removing an overwrite that is not there is not a failure
fn overwrite_already_gone(error: &serenity::Error) -> bool {
    matches!(
        error,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404
    )
}

/// Discord binding of the gateway.
///
/// A chat is a guild text channel. Member restrictions are overwrites on that
/// channel only; their expiry lives in the mute ledger and the reconciliation
/// loop lifts them. Chat-wide bundles edit the content bits of the channel's
/// `@everyone` overwrite, and the bot gets its own overwrite so a locked chat
/// still accepts its notices and deletions.
#[derive(Clone)]
pub struct SerenityGateway {
    http: Arc<Http>,
    bot_id: UserId,
}

impl SerenityGateway {
    pub fn new(http: Arc<Http>, bot_id: u64) -> Self {
        Self {
            http,
            bot_id: UserId::new(bot_id),
        }
    }

    async fn channel(&self, chat_id: u64) -> Result<GuildChannel, GatewayError> {
        let channel = ChannelId::new(chat_id)
            .to_channel(self.http.as_ref())
            .await?;

        channel.guild().ok_or(GatewayError::ChatNotFound(chat_id))
    }

    async fn guild_of(&self, chat_id: u64) -> Result<GuildId, GatewayError> {
        Ok(self.channel(chat_id).await?.guild_id)
    }

    async fn clear_member_overwrite(&self, chat_id: u64, user_id: UserId) -> Result<(), GatewayError> {
        let channel_id = ChannelId::new(chat_id);

        match channel_id
            .delete_permission(self.http.as_ref(), PermissionOverwriteType::Member(user_id))
            .await
        {
            Ok(()) => debug!("Removed overwrite of user {} in channel {}", user_id, channel_id),
            Err(e) if overwrite_already_gone(&e) => {
                debug!("User {} had no overwrite in channel {}", user_id, channel_id)
            }
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }
}

#[async_trait]
impl Gateway for SerenityGateway {
    async fn restrict_member(
        &self,
        chat_id: u64,
        user_id: u64,
        permissions: &ChatPermissions,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), GatewayError> {
        let user_id = UserId::new(user_id);

        if permissions.is_open() {
            return self.clear_member_overwrite(chat_id, user_id).await;
        }

        ChannelId::new(chat_id)
            .create_permission(self.http.as_ref(), member_overwrite(user_id, permissions))
            .await?;
        debug!(
            "Restricted user {} in channel {} until {:?}",
            user_id, chat_id, until
        );

        Ok(())
    }

    async fn set_chat_permissions(
        &self,
        chat_id: u64,
        permissions: &ChatPermissions,
    ) -> Result<(), GatewayError> {
        let channel = self.channel(chat_id).await?;
        let everyone = PermissionOverwriteType::Role(RoleId::new(channel.guild_id.get()));

        let existing = channel
            .permission_overwrites
            .iter()
            .find(|o| o.kind == everyone)
            .map(|o| (o.allow, o.deny));
        let (allow, deny) = merge_chat_overwrite(existing, permissions);

        channel
            .id
            .create_permission(
                self.http.as_ref(),
                PermissionOverwrite {
                    allow: bot_channel_permissions(),
                    deny: Permissions::empty(),
                    kind: PermissionOverwriteType::Member(self.bot_id),
                },
            )
            .await?;
        channel
            .id
            .create_permission(
                self.http.as_ref(),
                PermissionOverwrite {
                    allow,
                    deny,
                    kind: everyone,
                },
            )
            .await?;

        debug!("Applied chat-wide overwrite on channel {}", chat_id);
        Ok(())
    }

    async fn ban_member(&self, chat_id: u64, user_id: u64) -> Result<(), GatewayError> {
        let guild_id = self.guild_of(chat_id).await?;
        guild_id
            .ban(self.http.as_ref(), UserId::new(user_id), 0)
            .await?;
        Ok(())
    }

    async fn unban_member(&self, chat_id: u64, user_id: u64) -> Result<(), GatewayError> {
        let guild_id = self.guild_of(chat_id).await?;
        guild_id
            .unban(self.http.as_ref(), UserId::new(user_id))
            .await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: u64, message_id: u64) -> Result<(), GatewayError> {
        ChannelId::new(chat_id)
            .delete_message(self.http.as_ref(), MessageId::new(message_id))
            .await?;
        Ok(())
    }

    async fn send_message(&self, chat_id: u64, notice: &Notice) -> Result<(), GatewayError> {
        let message = CreateMessage::new().embed(embeds::notice_embed(notice));
        ChannelId::new(chat_id)
            .send_message(self.http.as_ref(), message)
            .await?;
        Ok(())
    }
}
