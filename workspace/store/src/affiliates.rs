//! Affiliate partners, their referral links and payouts.
//!
//! Earnings and payout amounts are `numeric(12, 2)`. They are checked with
//! [`common::money`] before every write and rescaled after every read.

use common::{money, new_id};
use model::entities::affiliate;
use model::entities::affiliate_link::{self, AffiliateLinkStatus};
use model::entities::affiliate_payout::{self, PayoutCrypto, PayoutStatus};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

use crate::Store;
use crate::error::{Result, StoreError};

#[derive(Clone, Default)]
pub struct NewAffiliate {
    pub id: Option<String>,
    pub login: String,
    /// Stored as given; hashing is the caller's job.
    pub password: String,
    pub info: Option<String>,
    pub payout_crypto_currency: Option<String>,
    pub payout_crypto_address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAffiliateLink {
    pub id: Option<String>,
    pub affiliate_id: String,
    pub code: String,
}

/// Increments to apply to a link's counters.
#[derive(Debug, Clone, Default)]
pub struct LinkActivity {
    pub clicks: u32,
    pub signups: u32,
    pub sales: u32,
    pub earnings: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewPayout {
    pub id: Option<String>,
    pub affiliate_id: String,
    pub amount: Decimal,
    pub crypto_used: PayoutCrypto,
}

fn normalize_link(mut link: affiliate_link::Model) -> affiliate_link::Model {
    link.earnings = money::from_storage(link.earnings);
    link
}

fn normalize_payout(mut payout: affiliate_payout::Model) -> affiliate_payout::Model {
    payout.amount = money::from_storage(payout.amount);
    payout
}

fn counter_overflow(what: &str, link_id: &str) -> StoreError {
    StoreError::Validation(format!("{what} counter of link {link_id} would overflow"))
}

fn step(by: u32, what: &str, link_id: &str) -> Result<i32> {
    i32::try_from(by).map_err(|_| counter_overflow(what, link_id))
}

async fn find_link<C: ConnectionTrait>(conn: &C, id: &str) -> Result<affiliate_link::Model> {
    affiliate_link::Entity::find_by_id(id.to_owned())
        .one(conn)
        .await?
        .map(normalize_link)
        .ok_or_else(|| StoreError::not_found("affiliate link", id))
}

async fn find_payout<C: ConnectionTrait>(conn: &C, id: &str) -> Result<affiliate_payout::Model> {
    affiliate_payout::Entity::find_by_id(id.to_owned())
        .one(conn)
        .await?
        .map(normalize_payout)
        .ok_or_else(|| StoreError::not_found("affiliate payout", id))
}

impl Store {
    #[instrument(skip_all, fields(login = %new.login))]
    pub async fn create_affiliate(&self, new: NewAffiliate) -> Result<affiliate::Model> {
        let now = self.now();
        let created = affiliate::ActiveModel {
            id: Set(new.id.unwrap_or_else(new_id)),
            login: Set(new.login),
            password: Set(new.password),
            info: Set(new.info),
            payout_crypto_currency: Set(new.payout_crypto_currency),
            payout_crypto_address: Set(new.payout_crypto_address),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!("Affiliate {} created ({})", created.id, created.login);
        Ok(created)
    }

    /// Creates an active link with zeroed counters.
    #[instrument(skip(self))]
    pub async fn create_affiliate_link(&self, new: NewAffiliateLink) -> Result<affiliate_link::Model> {
        let now = self.now();
        let created = affiliate_link::ActiveModel {
            id: Set(new.id.unwrap_or_else(new_id)),
            affiliate_id: Set(new.affiliate_id),
            code: Set(new.code),
            clicks: Set(0),
            signups: Set(0),
            sales: Set(0),
            earnings: Set(money::checked(Decimal::ZERO)?),
            status: Set(AffiliateLinkStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!("Link {} created for affiliate {}", created.code, created.affiliate_id);
        Ok(normalize_link(created))
    }

    #[instrument(skip(self))]
    pub async fn find_affiliate_link_by_code(&self, code: &str) -> Result<Option<affiliate_link::Model>> {
        Ok(affiliate_link::Entity::find()
            .filter(affiliate_link::Column::Code.eq(code))
            .one(&self.db)
            .await?
            .map(normalize_link))
    }

    #[instrument(skip(self))]
    pub async fn set_link_status(
        &self,
        id: &str,
        status: AffiliateLinkStatus,
    ) -> Result<affiliate_link::Model> {
        let existing = find_link(&self.db, id).await?;
        let mut active: affiliate_link::ActiveModel = existing.into();
        active.status = Set(status);
        active.updated_at = Set(self.now());
        let updated = active.update(&self.db).await?;
        debug!("Link {} is now {:?}", updated.id, updated.status);
        Ok(normalize_link(updated))
    }

    /// Adds `activity` to a link's counters and earnings in one transaction.
    ///
    /// Earnings only grow; a negative increment is rejected.
    #[instrument(skip(self))]
    pub async fn record_link_activity(
        &self,
        id: &str,
        activity: LinkActivity,
    ) -> Result<affiliate_link::Model> {
        if activity.earnings < Decimal::ZERO {
            return Err(StoreError::Validation(format!(
                "earnings increment must not be negative, got {}",
                activity.earnings
            )));
        }
        let increment = money::checked(activity.earnings)?;
        let clicks = step(activity.clicks, "clicks", id)?;
        let signups = step(activity.signups, "signups", id)?;
        let sales = step(activity.sales, "sales", id)?;

        let txn = self.db.begin().await?;
        let existing = find_link(&txn, id).await?;
        for (current, by, what) in [
            (existing.clicks, clicks, "clicks"),
            (existing.signups, signups, "signups"),
            (existing.sales, sales, "sales"),
        ] {
            if current.checked_add(by).is_none() {
                return Err(counter_overflow(what, id));
            }
        }
        money::add(existing.earnings, increment)?;

        // Increment in place so concurrent recordings add up instead of
        // overwriting each other
        let result = affiliate_link::Entity::update_many()
            .col_expr(affiliate_link::Column::Clicks, Expr::col(affiliate_link::Column::Clicks).add(clicks))
            .col_expr(affiliate_link::Column::Signups, Expr::col(affiliate_link::Column::Signups).add(signups))
            .col_expr(affiliate_link::Column::Sales, Expr::col(affiliate_link::Column::Sales).add(sales))
            .col_expr(
                affiliate_link::Column::Earnings,
                Expr::col(affiliate_link::Column::Earnings).add(increment),
            )
            .col_expr(affiliate_link::Column::UpdatedAt, Expr::value(self.now()))
            .filter(affiliate_link::Column::Id.eq(id))
            .filter(affiliate_link::Column::Clicks.lte(i32::MAX - clicks))
            .filter(affiliate_link::Column::Signups.lte(i32::MAX - signups))
            .filter(affiliate_link::Column::Sales.lte(i32::MAX - sales))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            warn!("Link {} counters moved past their limit while recording", id);
            return Err(counter_overflow("activity", id));
        }

        let updated = find_link(&txn, id).await?;
        money::checked(updated.earnings)?;

        txn.commit().await?;
        debug!(
            "Link {} now at {} clicks, {} signups, {} sales, {} earned",
            updated.id, updated.clicks, updated.signups, updated.sales, updated.earnings
        );
        Ok(updated)
    }

    /// Queues a payout. The amount must be positive and fit `numeric(12, 2)`.
    #[instrument(skip(self))]
    pub async fn create_payout(&self, new: NewPayout) -> Result<affiliate_payout::Model> {
        let amount = money::checked(new.amount)?;
        if amount <= Decimal::ZERO {
            return Err(StoreError::Validation(format!(
                "payout amount must be positive, got {amount}"
            )));
        }

        let now = self.now();
        let created = affiliate_payout::ActiveModel {
            id: Set(new.id.unwrap_or_else(new_id)),
            affiliate_id: Set(new.affiliate_id),
            amount: Set(amount),
            crypto_used: Set(new.crypto_used),
            crypto_transaction_hash: Set(None),
            status: Set(PayoutStatus::Pending),
            payout_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!("Payout {} of {} queued for affiliate {}", created.id, amount, created.affiliate_id);
        Ok(normalize_payout(created))
    }

    /// Marks a pending payout as sent.
    #[instrument(skip(self))]
    pub async fn complete_payout(&self, id: &str, tx_hash: String) -> Result<affiliate_payout::Model> {
        let now = self.now();
        self.finish_payout(id, PayoutStatus::Completed, Some(tx_hash), Some(now))
            .await
    }

    #[instrument(skip(self))]
    pub async fn fail_payout(&self, id: &str) -> Result<affiliate_payout::Model> {
        self.finish_payout(id, PayoutStatus::Failed, None, None).await
    }

    #[instrument(skip(self))]
    pub async fn list_payouts(&self, affiliate_id: &str) -> Result<Vec<affiliate_payout::Model>> {
        let payouts = affiliate_payout::Entity::find()
            .filter(affiliate_payout::Column::AffiliateId.eq(affiliate_id))
            .order_by_asc(affiliate_payout::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(payouts.into_iter().map(normalize_payout).collect())
    }

    async fn finish_payout(
        &self,
        id: &str,
        status: PayoutStatus,
        tx_hash: Option<String>,
        payout_at: Option<chrono::NaiveDateTime>,
    ) -> Result<affiliate_payout::Model> {
        let existing = find_payout(&self.db, id).await?;
        if existing.status != PayoutStatus::Pending {
            warn!("Payout {} is already {:?}", id, existing.status);
            return Err(StoreError::Validation(format!(
                "payout {id} is no longer pending"
            )));
        }

        let mut active: affiliate_payout::ActiveModel = existing.into();
        active.status = Set(status);
        if tx_hash.is_some() {
            active.crypto_transaction_hash = Set(tx_hash);
        }
        active.payout_at = Set(payout_at);
        active.updated_at = Set(self.now());
        let updated = active.update(&self.db).await?;

        info!("Payout {} is now {:?}", updated.id, updated.status);
        Ok(normalize_payout(updated))
    }
}
