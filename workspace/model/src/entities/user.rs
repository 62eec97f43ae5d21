use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

/// An account holder. Root of generation inputs, generations, orders,
/// sessions and linked accounts.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(default_value = "false")]
    pub email_verified: bool,
    pub username: Option<String>,
    /// Spendable generation credits.
    #[sea_orm(default_value = "0")]
    pub tokens: i32,
    /// While in the future, the user may generate without spending tokens.
    pub unlimited_tokens_end_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::generation_input::Entity")]
    GenerationInput,
    #[sea_orm(has_many = "super::generation::Entity")]
    Generation,
    #[sea_orm(has_many = "super::order::Entity")]
    Order,
    #[sea_orm(has_many = "super::session::Entity")]
    Session,
    #[sea_orm(has_many = "super::account::Entity")]
    Account,
}

impl Related<super::generation_input::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GenerationInput.def()
    }
}

impl Related<super::generation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Generation.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the unlimited-usage privilege is still running at `now`.
    pub fn has_unlimited_tokens(&self, now: NaiveDateTime) -> bool {
        self.unlimited_tokens_end_date.is_some_and(|end| end > now)
    }
}
