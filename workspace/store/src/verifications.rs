use chrono::NaiveDateTime;
use common::new_id;
use model::entities::verification;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{debug, instrument};

use crate::Store;
use crate::error::{Result, StoreError};

#[derive(Clone)]
pub struct NewVerification {
    pub id: Option<String>,
    pub identifier: String,
    pub value: String,
    pub expires_at: NaiveDateTime,
}

impl Store {
    /// Stores a challenge. Its timestamps stay null: the table has no default
    /// for them and readers treat null as "not yet confirmed by a write".
    #[instrument(skip_all, fields(identifier = %new.identifier))]
    pub async fn create_verification(&self, new: NewVerification) -> Result<verification::Model> {
        let created = verification::ActiveModel {
            id: Set(new.id.unwrap_or_else(new_id)),
            identifier: Set(new.identifier),
            value: Set(new.value),
            expires_at: Set(new.expires_at),
            created_at: Set(None),
            updated_at: Set(None),
        }
        .insert(&self.db)
        .await?;

        debug!("Verification {} stored", created.id);
        Ok(created)
    }

    /// The challenge for `identifier` that expires last.
    #[instrument(skip(self))]
    pub async fn find_verification(&self, identifier: &str) -> Result<Option<verification::Model>> {
        Ok(verification::Entity::find()
            .filter(verification::Column::Identifier.eq(identifier))
            .order_by_desc(verification::Column::ExpiresAt)
            .one(&self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_verification(&self, id: &str) -> Result<()> {
        let result = verification::Entity::delete_by_id(id.to_owned())
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(StoreError::not_found("verification", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{noon, setup_store};
    use chrono::Duration;

    #[tokio::test]
    async fn test_verification_timestamps_stay_null() {
        let (store, _clock) = setup_store().await;

        let created = store
            .create_verification(NewVerification {
                id: Some("v".to_string()),
                identifier: "x@nikiv.dev".to_string(),
                value: "482913".to_string(),
                expires_at: noon() + Duration::minutes(10),
            })
            .await
            .unwrap();

        assert_eq!(created.created_at, None);
        assert_eq!(created.updated_at, None);
        assert!(!created.is_expired(noon()));
    }

    #[tokio::test]
    async fn test_latest_challenge_wins() {
        let (store, _clock) = setup_store().await;
        for (id, minutes) in [("old", 5), ("new", 15)] {
            store
                .create_verification(NewVerification {
                    id: Some(id.to_string()),
                    identifier: "x@nikiv.dev".to_string(),
                    value: id.to_string(),
                    expires_at: noon() + Duration::minutes(minutes),
                })
                .await
                .unwrap();
        }

        let found = store.find_verification("x@nikiv.dev").await.unwrap().unwrap();
        assert_eq!(found.id, "new");

        store.delete_verification("new").await.unwrap();
        let found = store.find_verification("x@nikiv.dev").await.unwrap().unwrap();
        assert_eq!(found.id, "old");
        assert!(store.find_verification("other").await.unwrap().is_none());
    }
}
