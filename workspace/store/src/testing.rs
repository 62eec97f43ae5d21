use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use common::FixedClock;
use migration::{Migrator, MigratorTrait};
use model::entities::user;

use crate::users::NewUser;
use crate::{Store, connect};

/// Noon on 2024-03-01, the default "now" of test stores.
pub fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// A migrated in-memory database behind a store with a pinned clock.
pub async fn setup_store() -> (Store, Arc<FixedClock>) {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    Migrator::up(&db, None).await.expect("Migrations failed.");

    let clock = Arc::new(FixedClock::new(noon()));
    (Store::new(db, clock.clone()), clock)
}

pub async fn new_user(store: &Store, id: &str) -> user::Model {
    store
        .create_user(NewUser {
            id: Some(id.to_string()),
            email: format!("{id}@example.com"),
            ..Default::default()
        })
        .await
        .expect("Failed to create test user")
}
