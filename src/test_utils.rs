#[cfg(test)]
pub mod test_utils {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::Router;
    use chrono::{NaiveDate, NaiveDateTime};
    use common::FixedClock;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::DatabaseConnection;
    use store::Store;

    use crate::router::create_router;
    use crate::schemas::AppState;

    /// The pinned "now" of test stores.
    pub fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = store::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing, stamped by a clock fixed at [`noon`]
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;
        let clock = Arc::new(FixedClock::new(noon()));
        AppState {
            store: Store::new(db, clock),
        }
    }

    /// Send test logs to the captured test output. RUST_LOG picks the level,
    /// WARN otherwise.
    fn init_test_tracing() {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        init_test_tracing();
        let state = setup_test_app_state().await;
        create_router(state, Duration::from_secs(30))
    }
}
