//! Moderation core: the context shared by the message path and the
//! reconciliation loop.

use std::fmt;
use std::sync::Arc;

use crate::services::gateway::Gateway;
use crate::services::ledger::PenaltyLedger;
use crate::utils::permissions;

pub mod admin;
pub mod chat_registry;
pub mod enforcer;
pub mod message_policy;
pub mod reconciler;
pub mod time_window;

pub use chat_registry::ChatRegistry;
pub use enforcer::RestrictionEnforcer;

pub struct ModerationCore {
    pub ledger: Arc<dyn PenaltyLedger>,
    pub gateway: Arc<dyn Gateway>,
    pub chats: ChatRegistry,
    admins: Vec<u64>,
}

impl ModerationCore {
    pub fn new(
        ledger: Arc<dyn PenaltyLedger>,
        gateway: Arc<dyn Gateway>,
        admins: Vec<u64>,
    ) -> Self {
        Self {
            ledger,
            gateway,
            chats: ChatRegistry::new(),
            admins,
        }
    }

    pub fn is_admin(&self, user_id: u64) -> bool {
        permissions::is_admin(&self.admins, user_id)
    }

    pub fn enforcer(&self) -> RestrictionEnforcer<'_> {
        RestrictionEnforcer::new(self.gateway.as_ref(), self.ledger.as_ref())
    }
}

impl fmt::Debug for ModerationCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModerationCore")
            .field("known_chats", &self.chats.len())
            .field("admins", &self.admins.len())
            .finish_non_exhaustive()
    }
}
