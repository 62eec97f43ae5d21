use common::new_id;
use model::entities::generation::{self, GenerationStatus};
use model::entities::generation_input::{self, GenerationKind};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{debug, info, instrument, warn};

use crate::Store;
use crate::error::{Result, StoreError};

#[derive(Debug, Clone)]
pub struct NewGenerationInput {
    pub id: Option<String>,
    pub user_id: String,
    pub kind: GenerationKind,
    pub prompt: String,
    pub image_url: String,
}

#[derive(Debug, Clone)]
pub struct NewGeneration {
    pub id: Option<String>,
    pub user_id: String,
    pub generation_input_id: String,
    pub model: String,
}

impl Store {
    #[instrument(skip(self))]
    pub async fn create_generation_input(
        &self,
        new: NewGenerationInput,
    ) -> Result<generation_input::Model> {
        let now = self.now();
        let created = generation_input::ActiveModel {
            id: Set(new.id.unwrap_or_else(new_id)),
            user_id: Set(new.user_id),
            kind: Set(new.kind),
            prompt: Set(new.prompt),
            image_url: Set(new.image_url),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!("Generation input {} created for user {}", created.id, created.user_id);
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list_generation_inputs(&self, user_id: &str) -> Result<Vec<generation_input::Model>> {
        Ok(generation_input::Entity::find()
            .filter(generation_input::Column::UserId.eq(user_id))
            .order_by_asc(generation_input::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Records a new artifact in the `pending` state.
    #[instrument(skip(self))]
    pub async fn create_generation(&self, new: NewGeneration) -> Result<generation::Model> {
        let now = self.now();
        let created = generation::ActiveModel {
            id: Set(new.id.unwrap_or_else(new_id)),
            user_id: Set(new.user_id),
            generation_input_id: Set(new.generation_input_id),
            model: Set(new.model),
            status: Set(GenerationStatus::Pending),
            image_url: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(
            "Generation {} created for input {}",
            created.id, created.generation_input_id
        );
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_generation(&self, id: &str) -> Result<generation::Model> {
        generation::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::not_found("generation", id))
    }

    /// Moves a generation to `status`, storing the artifact location if given.
    ///
    /// Completed and failed generations are final.
    #[instrument(skip(self))]
    pub async fn update_generation_status(
        &self,
        id: &str,
        status: GenerationStatus,
        image_url: Option<String>,
    ) -> Result<generation::Model> {
        let existing = self.get_generation(id).await?;
        if existing.status.is_terminal() && existing.status != status {
            warn!(
                "Refusing to move generation {} from {:?} to {:?}",
                id, existing.status, status
            );
            return Err(StoreError::Validation(format!(
                "generation {id} is already {:?}",
                existing.status
            )));
        }

        let mut active: generation::ActiveModel = existing.into();
        active.status = Set(status);
        if let Some(url) = image_url {
            active.image_url = Set(Some(url));
        }
        active.updated_at = Set(self.now());

        let updated = active.update(&self.db).await?;
        debug!("Generation {} is now {:?}", updated.id, updated.status);
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn list_generations(&self, user_id: &str) -> Result<Vec<generation::Model>> {
        Ok(generation::Entity::find()
            .filter(generation::Column::UserId.eq(user_id))
            .order_by_asc(generation::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }
}
