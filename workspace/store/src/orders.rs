use chrono::NaiveDateTime;
use common::new_id;
use model::entities::order::{self, PaymentStatus, PurchaseMethod};
use model::entities::user;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

use crate::Store;
use crate::error::{Result, StoreError};

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: Option<String>,
    pub user_id: String,
    pub service: String,
    pub purchase_cost_in_cents: i32,
    pub method_of_purchase: PurchaseMethod,
    pub crypto_transaction_hash: Option<String>,
}

fn check_tokens(tokens: i32) -> Result<()> {
    if tokens < 0 {
        return Err(StoreError::Validation(format!(
            "token amount must not be negative, got {tokens}"
        )));
    }
    Ok(())
}

fn already_paid(id: &str) -> StoreError {
    warn!("Order {} is already paid", id);
    StoreError::Validation(format!("order {id} is already paid"))
}

async fn find_order<C: ConnectionTrait>(conn: &C, id: &str) -> Result<order::Model> {
    order::Entity::find_by_id(id.to_owned())
        .one(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("order", id))
}

/// Writes a confirmed payment onto `existing`.
async fn apply_payment<C: ConnectionTrait>(
    conn: &C,
    existing: order::Model,
    tokens: i32,
    paid_at: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<order::Model> {
    let mut active: order::ActiveModel = existing.into();
    active.payment_status = Set(Some(PaymentStatus::Paid.to_string()));
    active.tokens_amount_bought = Set(Some(tokens));
    active.paid_at = Set(Some(paid_at));
    active.updated_at = Set(now);
    Ok(active.update(conn).await?)
}

impl Store {
    /// Records a purchase attempt. The cost is always stored; payment is
    /// `pending` and no tokens are attached until it is confirmed.
    #[instrument(skip(self))]
    pub async fn create_order(&self, new: NewOrder) -> Result<order::Model> {
        if new.purchase_cost_in_cents < 0 {
            return Err(StoreError::Validation(format!(
                "purchase cost must not be negative, got {}",
                new.purchase_cost_in_cents
            )));
        }

        let now = self.now();
        let created = order::ActiveModel {
            id: Set(new.id.unwrap_or_else(new_id)),
            user_id: Set(new.user_id),
            service: Set(new.service),
            purchase_cost_in_cents: Set(new.purchase_cost_in_cents),
            method_of_purchase: Set(new.method_of_purchase),
            crypto_transaction_hash: Set(new.crypto_transaction_hash),
            tokens_amount_bought: Set(None),
            payment_status: Set(Some(PaymentStatus::Pending.to_string())),
            paid_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(
            "Order {} created for user {} ({} cents)",
            created.id, created.user_id, created.purchase_cost_in_cents
        );
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: &str) -> Result<order::Model> {
        find_order(&self.db, id).await
    }

    #[instrument(skip(self))]
    pub async fn list_orders(&self, user_id: &str) -> Result<Vec<order::Model>> {
        Ok(order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_asc(order::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Marks an order paid, recording how many tokens it bought.
    ///
    /// Only the order row changes. Crediting the user is a separate write;
    /// use [`Store::settle_order`] to do both atomically.
    #[instrument(skip(self))]
    pub async fn mark_order_paid(
        &self,
        id: &str,
        tokens: i32,
        paid_at: NaiveDateTime,
    ) -> Result<order::Model> {
        check_tokens(tokens)?;
        let existing = find_order(&self.db, id).await?;
        let updated = apply_payment(&self.db, existing, tokens, paid_at, self.now()).await?;
        info!("Order {} marked paid ({} tokens)", updated.id, tokens);
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn mark_order_failed(&self, id: &str, reason: Option<String>) -> Result<order::Model> {
        let existing = find_order(&self.db, id).await?;
        let mut active: order::ActiveModel = existing.into();
        active.payment_status = Set(Some(PaymentStatus::Failed { reason }.to_string()));
        active.updated_at = Set(self.now());

        let updated = active.update(&self.db).await?;
        warn!(
            "Order {} payment failed: {}",
            updated.id,
            updated.payment_status.as_deref().unwrap_or_default()
        );
        Ok(updated)
    }

    /// Confirms payment and credits the buyer's balance in one transaction.
    ///
    /// Both writes are done by the database: the order update only matches a
    /// row that is not yet paid, and the balance is incremented in place. A
    /// repeated or concurrent confirmation of the same order therefore cannot
    /// credit twice, and settles of different orders never overwrite each
    /// other's credit. A stored status that does not parse is refused.
    #[instrument(skip(self))]
    pub async fn settle_order(&self, id: &str, tokens: i32) -> Result<(order::Model, user::Model)> {
        check_tokens(tokens)?;

        let now = self.now();
        let txn = self.db.begin().await?;

        let existing = find_order(&txn, id).await?;
        match existing.payment_status() {
            Ok(Some(PaymentStatus::Paid)) => return Err(already_paid(id)),
            Ok(_) => {}
            Err(e) => {
                warn!("Order {} has an unreadable payment status: {}", id, e);
                return Err(StoreError::Validation(format!("order {id}: {e}")));
            }
        }

        let claimed = order::Entity::update_many()
            .col_expr(order::Column::PaymentStatus, Expr::value(PaymentStatus::Paid.to_string()))
            .col_expr(order::Column::TokensAmountBought, Expr::value(tokens))
            .col_expr(order::Column::PaidAt, Expr::value(now))
            .col_expr(order::Column::UpdatedAt, Expr::value(now))
            .filter(order::Column::Id.eq(id))
            .filter(
                Condition::any()
                    .add(order::Column::PaymentStatus.ne(PaymentStatus::Paid.to_string()))
                    .add(order::Column::PaymentStatus.is_null()),
            )
            .exec(&txn)
            .await?;
        if claimed.rows_affected == 0 {
            // Another settle committed between the read and the update
            return Err(already_paid(id));
        }

        let credited = user::Entity::update_many()
            .col_expr(user::Column::Tokens, Expr::col(user::Column::Tokens).add(tokens))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(existing.user_id.as_str()))
            .filter(user::Column::Tokens.lte(i32::MAX - tokens))
            .exec(&txn)
            .await?;
        if credited.rows_affected == 0 {
            // Dropping the transaction rolls the order back to its old status
            let buyer = user::Entity::find_by_id(existing.user_id.clone()).one(&txn).await?;
            return Err(match buyer {
                None => StoreError::not_found("user", existing.user_id),
                Some(buyer) => StoreError::Validation(format!(
                    "token balance of user {} would overflow",
                    buyer.id
                )),
            });
        }

        let order = find_order(&txn, id).await?;
        let buyer = user::Entity::find_by_id(existing.user_id.clone())
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found("user", existing.user_id.clone()))?;

        txn.commit().await?;
        debug!("User {} balance is now {}", buyer.id, buyer.tokens);
        info!("Order {} settled, {} tokens credited", order.id, tokens);
        Ok((order, buyer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{new_user, noon, setup_store};
    use chrono::Duration;
    use common::Clock;

    fn order_for(user_id: &str, id: &str) -> NewOrder {
        NewOrder {
            id: Some(id.to_string()),
            user_id: user_id.to_string(),
            service: "solbond".to_string(),
            purchase_cost_in_cents: 1999,
            method_of_purchase: PurchaseMethod::CryptoSol,
            crypto_transaction_hash: Some("5Kx9".to_string()),
        }
    }

    #[tokio::test]
    async fn test_pending_then_paid_states_are_both_observable() {
        let (store, clock) = setup_store().await;
        new_user(&store, "a").await;

        let pending = store.create_order(order_for("a", "o")).await.unwrap();
        assert_eq!(pending.payment_status().unwrap(), Some(PaymentStatus::Pending));
        assert_eq!(pending.tokens_amount_bought, None);
        assert_eq!(pending.paid_at, None);
        assert_eq!(pending.purchase_cost_in_cents, 1999);

        let stored = store.get_order("o").await.unwrap();
        assert_eq!(stored, pending);

        clock.advance(Duration::minutes(2));
        let paid_at = clock.now();
        let paid = store.mark_order_paid("o", 100, paid_at).await.unwrap();

        let stored = store.get_order("o").await.unwrap();
        assert_eq!(stored, paid);
        assert_eq!(stored.payment_status().unwrap(), Some(PaymentStatus::Paid));
        assert_eq!(stored.tokens_amount_bought, Some(100));
        assert_eq!(stored.paid_at, Some(paid_at));
        assert_eq!(stored.created_at, noon());

        // Marking paid does not touch the balance
        assert_eq!(store.get_user("a").await.unwrap().tokens, 0);
    }

    #[tokio::test]
    async fn test_failed_payment_keeps_reason() {
        let (store, _clock) = setup_store().await;
        new_user(&store, "a").await;
        store.create_order(order_for("a", "o")).await.unwrap();

        let failed = store
            .mark_order_failed("o", Some("card declined".to_string()))
            .await
            .unwrap();

        assert_eq!(failed.payment_status.as_deref(), Some("failed: card declined"));
        assert_eq!(
            failed.payment_status().unwrap(),
            Some(PaymentStatus::Failed { reason: Some("card declined".to_string()) })
        );
        assert_eq!(failed.tokens_amount_bought, None);
    }

    #[tokio::test]
    async fn test_settle_credits_once() {
        let (store, _clock) = setup_store().await;
        new_user(&store, "a").await;
        store.create_order(order_for("a", "o")).await.unwrap();

        let (order, buyer) = store.settle_order("o", 250).await.unwrap();
        assert_eq!(order.tokens_amount_bought, Some(250));
        assert_eq!(order.paid_at, Some(noon()));
        assert_eq!(buyer.tokens, 250);

        let err = store.settle_order("o", 250).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.get_user("a").await.unwrap().tokens, 250);
    }

    #[tokio::test]
    async fn test_order_for_missing_user_is_rejected() {
        let (store, _clock) = setup_store().await;

        let err = store.create_order(order_for("ghost", "o")).await.unwrap_err();
        assert!(matches!(err, StoreError::ReferentialIntegrity(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_negative_cost_is_rejected() {
        let (store, _clock) = setup_store().await;
        new_user(&store, "a").await;

        let mut order = order_for("a", "o");
        order.purchase_cost_in_cents = -1;
        let err = store.create_order(order).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_mark_paid_rejects_negative_tokens() {
        let (store, clock) = setup_store().await;
        new_user(&store, "a").await;
        store.create_order(order_for("a", "o")).await.unwrap();

        let err = store.mark_order_paid("o", -5, clock.now()).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)), "got {err:?}");
        assert_eq!(
            store.get_order("o").await.unwrap().payment_status().unwrap(),
            Some(PaymentStatus::Pending)
        );
    }

    #[tokio::test]
    async fn test_settle_refuses_unknown_status() {
        let (store, _clock) = setup_store().await;
        new_user(&store, "a").await;
        store.create_order(order_for("a", "o")).await.unwrap();
        order::Entity::update_many()
            .col_expr(order::Column::PaymentStatus, Expr::value("refunded"))
            .filter(order::Column::Id.eq("o"))
            .exec(store.db())
            .await
            .unwrap();

        let err = store.settle_order("o", 100).await.unwrap_err();

        assert!(matches!(err, StoreError::Validation(_)), "got {err:?}");
        let stored = store.get_order("o").await.unwrap();
        assert_eq!(stored.payment_status.as_deref(), Some("refunded"));
        assert_eq!(stored.tokens_amount_bought, None);
        assert_eq!(store.get_user("a").await.unwrap().tokens, 0);
    }

    #[tokio::test]
    async fn test_concurrent_settles_credit_every_order_once() {
        let (store, _clock) = setup_store().await;
        new_user(&store, "a").await;
        for n in 0..8 {
            store.create_order(order_for("a", &format!("o{n}"))).await.unwrap();
        }

        // Each order is confirmed twice at the same time
        let mut handles = Vec::new();
        for n in 0..8 {
            for _ in 0..2 {
                let store = store.clone();
                let id = format!("o{n}");
                handles.push(tokio::spawn(async move { store.settle_order(&id, 100).await }));
            }
        }

        let mut settled = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => settled += 1,
                Err(err) => assert!(matches!(err, StoreError::Validation(_)), "got {err:?}"),
            }
        }

        assert_eq!(settled, 8);
        assert_eq!(store.get_user("a").await.unwrap().tokens, 800);
        for order in store.list_orders("a").await.unwrap() {
            assert_eq!(order.tokens_amount_bought, Some(100));
        }
    }

    #[tokio::test]
    async fn test_settle_refuses_balance_overflow() {
        let (store, _clock) = setup_store().await;
        store
            .create_user(crate::users::NewUser {
                id: Some("rich".to_string()),
                email: "rich@example.com".to_string(),
                tokens: i32::MAX - 10,
                ..Default::default()
            })
            .await
            .unwrap();
        store.create_order(order_for("rich", "o")).await.unwrap();

        let err = store.settle_order("o", 11).await.unwrap_err();

        assert!(matches!(err, StoreError::Validation(_)), "got {err:?}");
        // The order update was rolled back with the failed credit
        assert_eq!(
            store.get_order("o").await.unwrap().payment_status().unwrap(),
            Some(PaymentStatus::Pending)
        );
    }
}
