use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (index, table, column) for every foreign-key column.
const FOREIGN_KEY_INDEXES: [(&str, &str, &str); 8] = [
    ("idx_generation_inputs_user_id", "generation_inputs", "user_id"),
    ("idx_generations_user_id", "generations", "user_id"),
    ("idx_generations_generation_input_id", "generations", "generation_input_id"),
    ("idx_orders_user_id", "orders", "user_id"),
    ("idx_sessions_user_id", "sessions", "user_id"),
    ("idx_accounts_user_id", "accounts", "user_id"),
    ("idx_affiliate_links_affiliate_id", "affiliate_links", "affiliate_id"),
    ("idx_affiliate_payouts_affiliate_id", "affiliate_payouts", "affiliate_id"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, column) in FOREIGN_KEY_INDEXES {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Alias::new(table))
                        .col(Alias::new(column))
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, _) in FOREIGN_KEY_INDEXES {
            manager
                .drop_index(Index::drop().name(name).table(Alias::new(table)).to_owned())
                .await?;
        }

        Ok(())
    }
}
