use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

use super::{ChatPermissions, Gateway, GatewayError, Notice};

/// Wraps a gateway so that no single call can stall its caller for longer
/// than `limit`.
#[derive(Debug, Clone)]
pub struct BoundedGateway<G> {
    inner: G,
    limit: Duration,
}

impl<G: Gateway> BoundedGateway<G> {
    pub fn new(inner: G, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, GatewayError>> + Send,
    ) -> Result<T, GatewayError> {
        match tokio::time::timeout(self.limit, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Gateway call {} timed out after {:?}", operation, self.limit);
                Err(GatewayError::Timeout {
                    operation,
                    limit: self.limit,
                })
            }
        }
    }
}

#[async_trait]
impl<G: Gateway> Gateway for BoundedGateway<G> {
    async fn restrict_member(
        &self,
        chat_id: u64,
        user_id: u64,
        permissions: &ChatPermissions,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), GatewayError> {
        self.bounded(
            "restrict_member",
            self.inner.restrict_member(chat_id, user_id, permissions, until),
        )
        .await
    }

    async fn set_chat_permissions(
        &self,
        chat_id: u64,
        permissions: &ChatPermissions,
    ) -> Result<(), GatewayError> {
        self.bounded(
            "set_chat_permissions",
            self.inner.set_chat_permissions(chat_id, permissions),
        )
        .await
    }

    async fn ban_member(&self, chat_id: u64, user_id: u64) -> Result<(), GatewayError> {
        self.bounded("ban_member", self.inner.ban_member(chat_id, user_id))
            .await
    }

    async fn unban_member(&self, chat_id: u64, user_id: u64) -> Result<(), GatewayError> {
        self.bounded("unban_member", self.inner.unban_member(chat_id, user_id))
            .await
    }

    async fn delete_message(&self, chat_id: u64, message_id: u64) -> Result<(), GatewayError> {
        self.bounded("delete_message", self.inner.delete_message(chat_id, message_id))
            .await
    }

    async fn send_message(&self, chat_id: u64, notice: &Notice) -> Result<(), GatewayError> {
        self.bounded("send_message", self.inner.send_message(chat_id, notice))
            .await
    }
}
