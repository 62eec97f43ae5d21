use anyhow::Result;
use ::config::{Config, Environment, File};
use serde::Deserialize;
use store::Store;
use tracing::{debug, info};

use crate::schemas::AppState;

/// Runtime settings.
///
/// Layered as: built-in defaults, then an optional `mediacredits.{toml,yaml,json}`
/// in the working directory, then environment variables (`DATABASE_URL`,
/// `BIND_ADDRESS`, `LOG_FILTER`, `REQUEST_TIMEOUT_SECS`). `.env` is loaded first.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    pub log_filter: String,
    pub request_timeout_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = Config::builder()
            .set_default("database_url", "sqlite://mediacredits.db?mode=rwc")?
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("log_filter", "mediacredits=debug,store=debug,tower_http=debug")?
            .set_default("request_timeout_secs", 30_i64)?
            .add_source(File::with_name("mediacredits").required(false))
            .add_source(Environment::default().try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

/// Connects to the database and builds the shared handler state.
pub async fn initialize_app_state(database_url: &str) -> Result<AppState> {
    debug!("Connecting to database");
    let db = store::connect(database_url).await?;
    info!("Database connection established");

    Ok(AppState {
        store: Store::with_system_clock(db),
    })
}
