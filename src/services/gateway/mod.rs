//! Outbound side of the transport: the operations moderation needs from the
//! chat platform, independent of which platform it is.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod bounded;
pub mod discord;
pub mod permissions;
#[cfg(test)]
pub mod testing;

pub use bounded::BoundedGateway;
pub use discord::SerenityGateway;
pub use permissions::ChatPermissions;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Discord API error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Chat not found: {0}")]
    ChatNotFound(u64),

    #[error("{operation} timed out after {limit:?}")]
    Timeout {
        operation: &'static str,
        limit: Duration,
    },
}

/// Tone of a chat notification, used for presentation only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

/// A message the bot posts into a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub tone: Tone,
    pub text: String,
}

impl Notice {
    pub fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Tone::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Tone::Success, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(Tone::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Tone::Error, text)
    }
}

/// Operations the moderation core invokes on the chat platform.
/// Every call is fallible; a failure is never reported as a silent no-op.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Apply a permission bundle to one member, optionally until `until`.
    async fn restrict_member(
        &self,
        chat_id: u64,
        user_id: u64,
        permissions: &ChatPermissions,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), GatewayError>;

    /// Apply a permission bundle to the whole chat.
    async fn set_chat_permissions(
        &self,
        chat_id: u64,
        permissions: &ChatPermissions,
    ) -> Result<(), GatewayError>;

    async fn ban_member(&self, chat_id: u64, user_id: u64) -> Result<(), GatewayError>;

    async fn unban_member(&self, chat_id: u64, user_id: u64) -> Result<(), GatewayError>;

    async fn delete_message(&self, chat_id: u64, message_id: u64) -> Result<(), GatewayError>;

    async fn send_message(&self, chat_id: u64, notice: &Notice) -> Result<(), GatewayError>;
}

#[async_trait]
impl<G: Gateway + ?Sized> Gateway for Arc<G> {
    async fn restrict_member(
        &self,
        chat_id: u64,
        user_id: u64,
        permissions: &ChatPermissions,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), GatewayError> {
        (**self).restrict_member(chat_id, user_id, permissions, until).await
    }

    async fn set_chat_permissions(
        &self,
        chat_id: u64,
        permissions: &ChatPermissions,
    ) -> Result<(), GatewayError> {
        (**self).set_chat_permissions(chat_id, permissions).await
    }

    async fn ban_member(&self, chat_id: u64, user_id: u64) -> Result<(), GatewayError> {
        (**self).ban_member(chat_id, user_id).await
    }

    async fn unban_member(&self, chat_id: u64, user_id: u64) -> Result<(), GatewayError> {
        (**self).unban_member(chat_id, user_id).await
    }

    async fn delete_message(&self, chat_id: u64, message_id: u64) -> Result<(), GatewayError> {
        (**self).delete_message(chat_id, message_id).await
    }

    async fn send_message(&self, chat_id: u64, notice: &Notice) -> Result<(), GatewayError> {
        (**self).send_message(chat_id, notice).await
    }
}
