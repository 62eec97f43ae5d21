use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::affiliate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum AffiliateLinkStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

/// A trackable referral code (`?ref=<code>`) owned by an affiliate.
///
/// The counters only grow under normal operation; the table itself does not
/// enforce it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "affiliate_links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub affiliate_id: String,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(default_value = "0")]
    pub clicks: i32,
    #[sea_orm(default_value = "0")]
    pub signups: i32,
    #[sea_orm(default_value = "0")]
    pub sales: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub earnings: Decimal,
    pub status: AffiliateLinkStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "affiliate::Entity",
        from = "Column::AffiliateId",
        to = "affiliate::Column::Id"
    )]
    Affiliate,
}

impl Related<affiliate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Affiliate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
