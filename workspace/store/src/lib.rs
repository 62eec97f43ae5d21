//! Read/write access to the credits database.
//!
//! [`Store`] wraps a connection and the application [`Clock`]. Every write
//! stamps `created_at`/`updated_at` from the clock; referential rules
//! (including which deletes cascade) are left to the engine.

pub mod accounts;
pub mod affiliates;
pub mod db;
pub mod error;
pub mod generations;
pub mod orders;
pub mod sessions;
pub mod users;
pub mod verifications;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use chrono::NaiveDateTime;
use common::{Clock, SystemClock};
use sea_orm::DatabaseConnection;

pub use db::connect;
pub use error::{Result, StoreError};

#[derive(Clone, Debug)]
pub struct Store {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
}

impl Store {
    pub fn new(db: DatabaseConnection, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// A store stamping rows with the UTC wall clock.
    pub fn with_system_clock(db: DatabaseConnection) -> Self {
        Self::new(db, Arc::new(SystemClock))
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Checks that the database still answers.
    pub async fn ping(&self) -> Result<()> {
        self.db.ping().await.map_err(StoreError::from_db)
    }
}
