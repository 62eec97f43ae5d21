use anyhow::{Context, Result};
use store::Store;
use store::users::NewUser;
use tracing::{error, info};

/// Id of the fixed development user.
pub const TEST_USER_ID: &str = "1";
pub const TEST_USER_EMAIL: &str = "x@nikiv.dev";

/// The row inserted by `create-test-user`.
pub fn test_user() -> NewUser {
    NewUser {
        id: Some(TEST_USER_ID.to_string()),
        email: TEST_USER_EMAIL.to_string(),
        email_verified: false,
        username: None,
        tokens: 0,
        unlimited_tokens_end_date: None,
    }
}

/// Inserts the development user and prints what the database returned.
///
/// Running it twice fails on the duplicate id/email.
pub async fn create_test_user(database_url: &str) -> Result<()> {
    let db = store::connect(database_url)
        .await
        .context("Failed to connect to database")?;
    let store = Store::with_system_clock(db);

    let created = match store.create_user(test_user()).await {
        Ok(user) => user,
        Err(e) => {
            error!("Failed to create test user: {}", e);
            return Err(e.into());
        }
    };
    info!("Test user {} created", created.id);

    println!("{created:#?}");
    println!("✔️");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_utils::{noon, setup_test_app_state};

    #[tokio::test]
    async fn test_user_reads_back_with_clock_timestamps() {
        let state = setup_test_app_state().await;

        let created = state.store.create_user(test_user()).await.unwrap();
        let stored = state.store.get_user(TEST_USER_ID).await.unwrap();

        assert_eq!(created, stored);
        assert_eq!(stored.email, TEST_USER_EMAIL);
        assert!(!stored.email_verified);
        assert_eq!(stored.username, None);
        assert_eq!(stored.tokens, 0);
        assert_eq!(stored.unlimited_tokens_end_date, None);
        assert_eq!(stored.created_at, noon());
        assert_eq!(stored.updated_at, noon());

        // A second run hits the unique keys
        let err = state.store.create_user(test_user()).await.unwrap_err();
        assert!(matches!(err, store::StoreError::Duplicate(_)));
    }
}
