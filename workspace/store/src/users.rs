use chrono::NaiveDateTime;
use common::new_id;
use model::entities::user;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{debug, info, instrument, warn};

use crate::Store;
use crate::error::{Result, StoreError};

/// Fields of a user supplied at signup.
///
/// `id` defaults to a fresh UUID; everything else mirrors the column defaults.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub id: Option<String>,
    pub email: String,
    pub email_verified: bool,
    pub username: Option<String>,
    pub tokens: i32,
    pub unlimited_tokens_end_date: Option<NaiveDateTime>,
}

/// Partial update of a user. `None` leaves a field untouched; the nested
/// options of nullable columns allow clearing them.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub username: Option<Option<String>>,
    pub tokens: Option<i32>,
    pub unlimited_tokens_end_date: Option<Option<NaiveDateTime>>,
}

impl Store {
    #[instrument(skip(self))]
    pub async fn create_user(&self, new: NewUser) -> Result<user::Model> {
        let now = self.now();
        let id = new.id.unwrap_or_else(new_id);
        debug!("Inserting user {} <{}>", id, new.email);

        let created = user::ActiveModel {
            id: Set(id),
            email: Set(new.email),
            email_verified: Set(new.email_verified),
            username: Set(new.username),
            tokens: Set(new.tokens),
            unlimited_tokens_end_date: Set(new.unlimited_tokens_end_date),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!("User created with ID: {}", created.id);
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> Result<user::Model> {
        user::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    #[instrument(skip(self))]
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    /// All users, oldest first.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<user::Model>> {
        let users = user::Entity::find()
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?;
        debug!("Retrieved {} users", users.len());
        Ok(users)
    }

    #[instrument(skip(self))]
    pub async fn update_user(&self, id: &str, changes: UserChanges) -> Result<user::Model> {
        let existing = self.get_user(id).await?;
        let mut active: user::ActiveModel = existing.into();

        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(email_verified) = changes.email_verified {
            active.email_verified = Set(email_verified);
        }
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(tokens) = changes.tokens {
            active.tokens = Set(tokens);
        }
        if let Some(end) = changes.unlimited_tokens_end_date {
            active.unlimited_tokens_end_date = Set(end);
        }
        active.updated_at = Set(self.now());

        let updated = active.update(&self.db).await?;
        info!("User {} updated", updated.id);
        Ok(updated)
    }

    /// Deletes a user.
    ///
    /// The engine removes the user's generations and orders with it. Generation
    /// inputs, sessions and accounts do not cascade: while any exist the delete
    /// is refused with [`StoreError::ReferentialIntegrity`].
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> Result<()> {
        let result = user::Entity::delete_by_id(id.to_owned())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            warn!("User {} not found for deletion", id);
            return Err(StoreError::not_found("user", id));
        }

        info!("User {} deleted", id);
        Ok(())
    }
}
