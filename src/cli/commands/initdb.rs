use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::ConnectionTrait;
use tracing::{debug, error, info, instrument};

/// Brings the schema at `database_url` up to date and reports what was applied.
#[instrument(skip(database_url))]
pub async fn init_database(database_url: &str) -> Result<()> {
    let db = store::connect(database_url).await.map_err(|e| {
        error!("Failed to connect to database: {}", e);
        e
    })?;
    let backend = db.get_database_backend();

    let pending = Migrator::get_pending_migrations(&db)
        .await
        .context("failed to read migration history")?;
    if pending.is_empty() {
        info!(?backend, "Schema is already up to date");
        return Ok(());
    }
    for migration in &pending {
        debug!("Pending migration {}", migration.name());
    }

    Migrator::up(&db, None).await.map_err(|e| {
        error!(?backend, "Failed to run database migrations: {}", e);
        e
    })?;

    info!(?backend, applied = pending.len(), "Database initialized");
    Ok(())
}
