//! Gateway double that records every successful call.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::{ChatPermissions, Gateway, GatewayError, Notice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Restrict {
        chat_id: u64,
        user_id: u64,
        permissions: ChatPermissions,
        until: Option<DateTime<Utc>>,
    },
    ChatPermissions {
        chat_id: u64,
        permissions: ChatPermissions,
    },
    Ban {
        chat_id: u64,
        user_id: u64,
    },
    Unban {
        chat_id: u64,
        user_id: u64,
    },
    Delete {
        chat_id: u64,
        message_id: u64,
    },
    Send {
        chat_id: u64,
        notice: Notice,
    },
}

#[derive(Debug, Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<u64>>,
    hanging: Mutex<HashSet<u64>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call touching `chat_id` fails with an API error
    pub fn fail_chat(&self, chat_id: u64) {
        self.failing.lock().insert(chat_id);
    }

    /// Every call touching `chat_id` never completes
    pub fn hang_chat(&self, chat_id: u64) {
        self.hanging.lock().insert(chat_id);
    }

    pub fn heal_chat(&self, chat_id: u64) {
        self.failing.lock().remove(&chat_id);
        self.hanging.lock().remove(&chat_id);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn sent_to(&self, chat_id: u64) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Send { chat_id: id, notice } if *id == chat_id => Some(notice.text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn chat_permission_calls(&self, chat_id: u64) -> Vec<ChatPermissions> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::ChatPermissions {
                    chat_id: id,
                    permissions,
                } if *id == chat_id => Some(*permissions),
                _ => None,
            })
            .collect()
    }

    pub fn restrictions_of(&self, chat_id: u64, user_id: u64) -> Vec<(ChatPermissions, Option<DateTime<Utc>>)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Restrict {
                    chat_id: cid,
                    user_id: uid,
                    permissions,
                    until,
                } if *cid == chat_id && *uid == user_id => Some((*permissions, *until)),
                _ => None,
            })
            .collect()
    }

    async fn record(&self, chat_id: u64, call: Call) -> Result<(), GatewayError> {
        let hangs = self.hanging.lock().contains(&chat_id);
        if hangs {
            std::future::pending::<()>().await;
        }
        let fails = self.failing.lock().contains(&chat_id);
        if fails {
            return Err(GatewayError::Api(format!("chat {} rejected the call", chat_id)));
        }
        self.calls.lock().push(call);
        Ok(())
    }
}

#[async_trait]
impl Gateway for RecordingGateway {
    async fn restrict_member(
        &self,
        chat_id: u64,
        user_id: u64,
        permissions: &ChatPermissions,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), GatewayError> {
        self.record(
            chat_id,
            Call::Restrict {
                chat_id,
                user_id,
                permissions: *permissions,
                until,
            },
        )
        .await
    }

    async fn set_chat_permissions(
        &self,
        chat_id: u64,
        permissions: &ChatPermissions,
    ) -> Result<(), GatewayError> {
        self.record(
            chat_id,
            Call::ChatPermissions {
                chat_id,
                permissions: *permissions,
            },
        )
        .await
    }

    async fn ban_member(&self, chat_id: u64, user_id: u64) -> Result<(), GatewayError> {
        self.record(chat_id, Call::Ban { chat_id, user_id }).await
    }

    async fn unban_member(&self, chat_id: u64, user_id: u64) -> Result<(), GatewayError> {
        self.record(chat_id, Call::Unban { chat_id, user_id }).await
    }

    async fn delete_message(&self, chat_id: u64, message_id: u64) -> Result<(), GatewayError> {
        self.record(chat_id, Call::Delete { chat_id, message_id })
            .await
    }

    async fn send_message(&self, chat_id: u64, notice: &Notice) -> Result<(), GatewayError> {
        self.record(
            chat_id,
            Call::Send {
                chat_id,
                notice: notice.clone(),
            },
        )
        .await
    }
}
