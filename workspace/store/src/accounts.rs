use chrono::NaiveDateTime;
use common::new_id;
use model::entities::account;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{info, instrument};

use crate::Store;
use crate::error::Result;

/// A provider identity to link to a user.
#[derive(Clone, Default)]
pub struct NewAccount {
    pub id: Option<String>,
    pub user_id: String,
    pub account_id: String,
    pub provider_id: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub access_token_expires_at: Option<NaiveDateTime>,
    pub refresh_token_expires_at: Option<NaiveDateTime>,
    pub scope: Option<String>,
    pub password: Option<String>,
}

impl Store {
    #[instrument(skip_all, fields(user_id = %new.user_id, provider_id = %new.provider_id))]
    pub async fn link_account(&self, new: NewAccount) -> Result<account::Model> {
        let now = self.now();
        let created = account::ActiveModel {
            id: Set(new.id.unwrap_or_else(new_id)),
            user_id: Set(new.user_id),
            account_id: Set(new.account_id),
            provider_id: Set(new.provider_id),
            access_token: Set(new.access_token),
            refresh_token: Set(new.refresh_token),
            id_token: Set(new.id_token),
            access_token_expires_at: Set(new.access_token_expires_at),
            refresh_token_expires_at: Set(new.refresh_token_expires_at),
            scope: Set(new.scope),
            password: Set(new.password),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!("Linked {} account {} to user {}", created.provider_id, created.id, created.user_id);
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list_accounts(&self, user_id: &str) -> Result<Vec<account::Model>> {
        Ok(account::Entity::find()
            .filter(account::Column::UserId.eq(user_id))
            .order_by_asc(account::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// The link for a provider-side identity, if any.
    #[instrument(skip(self))]
    pub async fn find_account(
        &self,
        provider_id: &str,
        account_id: &str,
    ) -> Result<Option<account::Model>> {
        Ok(account::Entity::find()
            .filter(account::Column::ProviderId.eq(provider_id))
            .filter(account::Column::AccountId.eq(account_id))
            .one(&self.db)
            .await?)
    }
}
