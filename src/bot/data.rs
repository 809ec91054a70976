use std::fmt;
use std::sync::Arc;

use crate::config::Settings;
use crate::services::moderation::ModerationCore;

/// Shared data available to all commands and handlers
pub struct Data {
    pub settings: Settings,
    /// Ledger, gateway and chat registry shared with the reconciliation loop
    pub core: Arc<ModerationCore>,
}

impl Data {
    pub fn new(settings: Settings, core: Arc<ModerationCore>) -> Self {
        Self { settings, core }
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("core", &self.core)
            .field("prefix", &self.settings.command_prefix)
            .finish_non_exhaustive()
    }
}

pub type Context<'a> = poise::Context<'a, Arc<Data>, crate::bot::error::Error>;
