use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

use super::{generation_input, user};

/// Lifecycle of a produced artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum GenerationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl GenerationStatus {
    /// Completed and failed generations never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One artifact produced for a generation input.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "generations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub generation_input_id: String,
    /// Identifier of the generation backend.
    pub model: String,
    pub status: GenerationStatus,
    /// Populated once the artifact is stored.
    pub image_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::UserId",
        to = "user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "generation_input::Entity",
        from = "Column::GenerationInputId",
        to = "generation_input::Column::Id"
    )]
    GenerationInput,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<generation_input::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GenerationInput.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
