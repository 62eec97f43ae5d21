pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_table;
mod m20250102_000001_add_foreign_key_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_table::Migration),
            Box::new(m20250102_000001_add_foreign_key_indexes::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Database;

    const TABLES: [&str; 10] = [
        "users",
        "generation_inputs",
        "generations",
        "orders",
        "sessions",
        "accounts",
        "verifications",
        "affiliates",
        "affiliate_links",
        "affiliate_payouts",
    ];

    #[tokio::test]
    async fn test_migrations_apply_and_roll_back() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let manager = SchemaManager::new(&db);

        Migrator::up(&db, None).await.unwrap();
        for table in TABLES {
            assert!(manager.has_table(table).await.unwrap(), "{table} missing");
        }
        assert!(manager.has_index("orders", "idx_orders_user_id").await.unwrap());
        assert!(
            manager
                .has_index("generations", "idx_generations_generation_input_id")
                .await
                .unwrap()
        );

        Migrator::down(&db, None).await.unwrap();
        for table in TABLES {
            assert!(!manager.has_table(table).await.unwrap(), "{table} left behind");
        }

        // A rolled back schema can be rebuilt
        Migrator::up(&db, None).await.unwrap();
        assert!(manager.has_table("users").await.unwrap());
    }
}
