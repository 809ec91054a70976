use std::env;
use std::time::Duration;

use tracing::warn;

use crate::constants::timeouts::DEFAULT_GATEWAY_TIMEOUT_SECONDS;

#[derive(Debug, Clone)]
pub struct Settings {
    pub discord_token: String,
    /// Without a database the ledger lives in memory and is lost on restart
    pub database_url: Option<String>,
    /// Users allowed to run moderation commands
    pub admin_ids: Vec<u64>,
    pub command_prefix: String,
    /// Upper bound for a single call to the Discord API
    pub gateway_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| "DISCORD_TOKEN environment variable not set")?;

        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        let admin_ids = env::var("ADMINS")
            .map(|raw| parse_admin_ids(&raw))
            .unwrap_or_default();

        let command_prefix = env::var("COMMAND_PREFIX")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "!".to_string());

        let gateway_timeout = env::var("GATEWAY_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_GATEWAY_TIMEOUT_SECONDS));

        Ok(Self {
            discord_token,
            database_url,
            admin_ids,
            command_prefix,
            gateway_timeout,
        })
    }
}

/// Parse a comma-separated list of user ids, skipping malformed entries
pub fn parse_admin_ids(raw: &str) -> Vec<u64> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.parse::<u64>() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!("Ignoring malformed admin id {:?}", entry);
                None
            }
        })
        .collect()
}
