use chrono::NaiveDateTime;
use common::new_id;
use model::entities::session;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::{debug, info, instrument};

use crate::Store;
use crate::error::{Result, StoreError};

#[derive(Clone)]
pub struct NewSession {
    pub id: Option<String>,
    pub user_id: String,
    pub token: String,
    pub expires_at: NaiveDateTime,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

// Keeps the bearer token out of logs
impl std::fmt::Debug for NewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewSession")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("expires_at", &self.expires_at)
            .field("ip_address", &self.ip_address)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl Store {
    #[instrument(skip(self))]
    pub async fn create_session(&self, new: NewSession) -> Result<session::Model> {
        let now = self.now();
        let created = session::ActiveModel {
            id: Set(new.id.unwrap_or_else(new_id)),
            user_id: Set(new.user_id),
            token: Set(new.token),
            expires_at: Set(new.expires_at),
            created_at: Set(now),
            updated_at: Set(now),
            ip_address: Set(new.ip_address),
            user_agent: Set(new.user_agent),
        }
        .insert(&self.db)
        .await?;

        info!("Session {} created for user {}", created.id, created.user_id);
        Ok(created)
    }

    /// Looks a session up by token. Expired sessions are returned too; check
    /// [`session::Model::is_expired`].
    #[instrument(skip_all)]
    pub async fn find_session_by_token(&self, token: &str) -> Result<Option<session::Model>> {
        Ok(session::Entity::find()
            .filter(session::Column::Token.eq(token))
            .one(&self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_session(&self, id: &str) -> Result<()> {
        let result = session::Entity::delete_by_id(id.to_owned())
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(StoreError::not_found("session", id));
        }
        debug!("Session {} deleted", id);
        Ok(())
    }

    /// Removes every session whose expiry has passed. Returns how many went.
    #[instrument(skip(self))]
    pub async fn delete_expired_sessions(&self) -> Result<u64> {
        let result = session::Entity::delete_many()
            .filter(session::Column::ExpiresAt.lte(self.now()))
            .exec(&self.db)
            .await?;
        info!("Removed {} expired sessions", result.rows_affected);
        Ok(result.rows_affected)
    }
}
