use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend};
use tracing::{debug, info, instrument};

use crate::error::Result;

/// Opens a connection and makes sure the engine enforces foreign keys.
#[instrument(skip(database_url))]
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database");
    let db = Database::connect(database_url).await?;

    if db.get_database_backend() == DbBackend::Sqlite {
        // SQLite ignores REFERENCES clauses unless asked per connection
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;
    }

    info!(backend = ?db.get_database_backend(), "Connected to database");
    Ok(db)
}
