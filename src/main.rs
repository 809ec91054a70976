use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use warden::services::ledger::{MemoryLedger, PenaltyLedger, PgLedger};
use warden::{bot, config::Settings, db};

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Warden moderation bot");

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to load settings: {}", e);
            std::process::exit(1);
        }
    };

    if settings.admin_ids.is_empty() {
        warn!("ADMINS is empty, moderation commands will be refused for everyone");
    }

    let ledger: Arc<dyn PenaltyLedger> = match &settings.database_url {
        Some(url) => {
            let pool = match db::pool::create_pool(url).await {
                Ok(p) => p,
                Err(e) => {
                    error!("Failed to create database pool: {}", e);
                    std::process::exit(1);
                }
            };

            if let Err(e) = db::pool::run_migrations(&pool).await {
                error!("Failed to run migrations: {}", e);
                std::process::exit(1);
            }

            info!("Database initialized successfully");
            Arc::new(PgLedger::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, penalties are kept in memory only");
            Arc::new(MemoryLedger::new())
        }
    };

    if let Err(e) = bot::framework::run(settings, ledger).await {
        error!("Bot error: {}", e);
        std::process::exit(1);
    }
}
