//! SeaORM entities for every table of the credits store.
//!
//! Ids are caller-supplied text keys. Users and affiliates are the two roots;
//! verifications stand alone.

pub mod account;
pub mod affiliate;
pub mod affiliate_link;
pub mod affiliate_payout;
pub mod generation;
pub mod generation_input;
pub mod order;
pub mod session;
pub mod user;
pub mod verification;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::account::Entity as Account;
    pub use super::affiliate::Entity as Affiliate;
    pub use super::affiliate_link::Entity as AffiliateLink;
    pub use super::affiliate_payout::Entity as AffiliatePayout;
    pub use super::generation::Entity as Generation;
    pub use super::generation_input::Entity as GenerationInput;
    pub use super::order::Entity as Order;
    pub use super::session::Entity as Session;
    pub use super::user::Entity as User;
    pub use super::verification::Entity as Verification;
}

#[cfg(test)]
mod test {
    use chrono::{NaiveDate, NaiveDateTime};
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        // Connect to the SQLite database
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let now = at(12);

        let owner = user::ActiveModel {
            id: Set("u1".to_string()),
            email: Set("owner@example.com".to_string()),
            email_verified: Set(false),
            username: Set(None),
            tokens: Set(0),
            unlimited_tokens_end_date: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await?;

        let input = generation_input::ActiveModel {
            id: Set("in1".to_string()),
            user_id: Set(owner.id.clone()),
            kind: Set(generation_input::GenerationKind::Video),
            prompt: Set("a cat surfing".to_string()),
            image_url: Set("s3://bucket/cat.png".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await?;

        generation::ActiveModel {
            id: Set("g1".to_string()),
            user_id: Set(owner.id.clone()),
            generation_input_id: Set(input.id.clone()),
            model: Set("kling-1.6".to_string()),
            status: Set(generation::GenerationStatus::Processing),
            image_url: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await?;

        order::ActiveModel {
            id: Set("o1".to_string()),
            user_id: Set(owner.id.clone()),
            service: Set("paytech".to_string()),
            purchase_cost_in_cents: Set(999),
            method_of_purchase: Set(order::PurchaseMethod::CryptoTon),
            crypto_transaction_hash: Set(None),
            tokens_amount_bought: Set(None),
            payment_status: Set(Some(order::PaymentStatus::Pending.to_string())),
            paid_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await?;

        session::ActiveModel {
            id: Set("s1".to_string()),
            user_id: Set(owner.id.clone()),
            token: Set("tok".to_string()),
            expires_at: Set(at(13)),
            created_at: Set(now),
            updated_at: Set(now),
            ip_address: Set(Some("127.0.0.1".to_string())),
            user_agent: Set(None),
        }
        .insert(&db)
        .await?;

        account::ActiveModel {
            id: Set("a1".to_string()),
            user_id: Set(owner.id.clone()),
            account_id: Set("google-123".to_string()),
            provider_id: Set("google".to_string()),
            access_token: Set(Some("access".to_string())),
            refresh_token: Set(None),
            id_token: Set(None),
            access_token_expires_at: Set(Some(at(14))),
            refresh_token_expires_at: Set(None),
            scope: Set(Some("email profile".to_string())),
            password: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await?;

        let verification = verification::ActiveModel {
            id: Set("v1".to_string()),
            identifier: Set("owner@example.com".to_string()),
            value: Set("123456".to_string()),
            expires_at: Set(at(13)),
            created_at: Set(None),
            updated_at: Set(None),
        }
        .insert(&db)
        .await?;
        assert_eq!(verification.created_at, None);

        let partner = affiliate::ActiveModel {
            id: Set("af1".to_string()),
            login: Set("partner".to_string()),
            password: Set("hash".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            info: Set(None),
            payout_crypto_currency: Set(Some("ton".to_string())),
            payout_crypto_address: Set(None),
        }
        .insert(&db)
        .await?;

        affiliate_link::ActiveModel {
            id: Set("l1".to_string()),
            affiliate_id: Set(partner.id.clone()),
            code: Set("SPRING".to_string()),
            clicks: Set(0),
            signups: Set(0),
            sales: Set(0),
            earnings: Set(Decimal::ZERO),
            status: Set(affiliate_link::AffiliateLinkStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await?;

        affiliate_payout::ActiveModel {
            id: Set("p1".to_string()),
            affiliate_id: Set(partner.id.clone()),
            amount: Set(Decimal::new(2500, 2)),
            crypto_used: Set(affiliate_payout::PayoutCrypto::Ton),
            crypto_transaction_hash: Set(None),
            status: Set(affiliate_payout::PayoutStatus::Pending),
            payout_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await?;

        // Walk relations from both roots
        assert_eq!(owner.find_related(GenerationInput).all(&db).await?.len(), 1);
        assert_eq!(owner.find_related(Generation).all(&db).await?.len(), 1);
        assert_eq!(owner.find_related(Order).all(&db).await?.len(), 1);
        assert_eq!(owner.find_related(Session).all(&db).await?.len(), 1);
        assert_eq!(owner.find_related(Account).all(&db).await?.len(), 1);
        assert_eq!(input.find_related(Generation).all(&db).await?.len(), 1);
        assert_eq!(partner.find_related(AffiliateLink).all(&db).await?.len(), 1);
        assert_eq!(partner.find_related(AffiliatePayout).all(&db).await?.len(), 1);

        let stored_order = Order::find_by_id("o1".to_string()).one(&db).await?.unwrap();
        assert_eq!(
            stored_order.payment_status().unwrap(),
            Some(order::PaymentStatus::Pending)
        );

        let video_inputs = GenerationInput::find()
            .filter(generation_input::Column::Kind.eq(generation_input::GenerationKind::Video))
            .all(&db)
            .await?;
        assert_eq!(video_inputs.len(), 1);

        let session = Session::find()
            .filter(session::Column::Token.eq("tok"))
            .one(&db)
            .await?
            .unwrap();
        assert!(!session.is_expired(now));
        assert!(session.is_expired(at(13)));

        Ok(())
    }

    #[tokio::test]
    async fn test_column_defaults_fill_omitted_fields() -> Result<(), DbErr> {
        let db = setup_db().await?;

        // Written the way a foreign client would: no defaults supplied
        db.execute_unprepared(
            "INSERT INTO users (id, email) VALUES ('raw', 'raw@example.com')",
        )
        .await?;

        let raw = User::find_by_id("raw".to_string()).one(&db).await?.unwrap();
        assert!(!raw.email_verified);
        assert_eq!(raw.tokens, 0);
        assert_eq!(raw.username, None);

        Ok(())
    }
}
