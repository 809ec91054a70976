use thiserror::Error;

use crate::services::gateway::GatewayError;
use crate::services::ledger::LedgerError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Discord API error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl Error {
    /// Failures of the transport rather than of our own state
    pub fn is_gateway(&self) -> bool {
        matches!(self, Error::Gateway(_) | Error::Serenity(_))
    }
}
