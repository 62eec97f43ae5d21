use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

/// A referral partner.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "affiliates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub login: String,
    pub password: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// Free-form notes about the partner.
    #[sea_orm(column_type = "Text", nullable)]
    pub info: Option<String>,
    pub payout_crypto_currency: Option<String>,
    pub payout_crypto_address: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::affiliate_link::Entity")]
    AffiliateLink,
    #[sea_orm(has_many = "super::affiliate_payout::Entity")]
    AffiliatePayout,
}

impl Related<super::affiliate_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AffiliateLink.def()
    }
}

impl Related<super::affiliate_payout::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AffiliatePayout.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
