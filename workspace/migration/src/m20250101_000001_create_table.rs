use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(text(Users::Id).primary_key())
                    .col(text(Users::Email).unique_key())
                    .col(boolean(Users::EmailVerified).default(false))
                    .col(text_null(Users::Username))
                    .col(integer(Users::Tokens).default(0))
                    .col(timestamp_null(Users::UnlimitedTokensEndDate))
                    .col(timestamp(Users::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Users::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        // Create generation_inputs table
        manager
            .create_table(
                Table::create()
                    .table(GenerationInputs::Table)
                    .if_not_exists()
                    .col(text(GenerationInputs::Id).primary_key())
                    .col(text(GenerationInputs::UserId))
                    .col(string_len(GenerationInputs::Type, 20))
                    .col(text(GenerationInputs::Prompt))
                    .col(text(GenerationInputs::ImageUrl))
                    .col(timestamp(GenerationInputs::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(GenerationInputs::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_generation_inputs_user")
                            .from(GenerationInputs::Table, GenerationInputs::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create generations table; only the owner link cascades
        manager
            .create_table(
                Table::create()
                    .table(Generations::Table)
                    .if_not_exists()
                    .col(text(Generations::Id).primary_key())
                    .col(text(Generations::UserId))
                    .col(text(Generations::GenerationInputId))
                    .col(text(Generations::Model))
                    .col(string_len(Generations::Status, 20))
                    .col(text_null(Generations::ImageUrl))
                    .col(timestamp(Generations::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Generations::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_generations_user")
                            .from(Generations::Table, Generations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_generations_generation_input")
                            .from(Generations::Table, Generations::GenerationInputId)
                            .to(GenerationInputs::Table, GenerationInputs::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create orders table
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(text(Orders::Id).primary_key())
                    .col(text(Orders::UserId))
                    .col(text(Orders::Service))
                    .col(integer(Orders::PurchaseCostInCents))
                    .col(string_len(Orders::MethodOfPurchase, 20))
                    .col(text_null(Orders::CryptoTransactionHash))
                    .col(integer_null(Orders::TokensAmountBought))
                    .col(text_null(Orders::PaymentStatus))
                    .col(timestamp_null(Orders::PaidAt))
                    .col(timestamp(Orders::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Orders::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_user")
                            .from(Orders::Table, Orders::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create sessions table
        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(text(Sessions::Id).primary_key())
                    .col(text(Sessions::UserId))
                    .col(text(Sessions::Token).unique_key())
                    .col(timestamp(Sessions::ExpiresAt))
                    .col(timestamp(Sessions::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Sessions::UpdatedAt).default(Expr::current_timestamp()))
                    .col(text_null(Sessions::IpAddress))
                    .col(text_null(Sessions::UserAgent))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sessions_user")
                            .from(Sessions::Table, Sessions::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create accounts table
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(text(Accounts::Id).primary_key())
                    .col(text(Accounts::UserId))
                    .col(text(Accounts::AccountId))
                    .col(text(Accounts::ProviderId))
                    .col(text_null(Accounts::AccessToken))
                    .col(text_null(Accounts::RefreshToken))
                    .col(text_null(Accounts::IdToken))
                    .col(timestamp_null(Accounts::AccessTokenExpiresAt))
                    .col(timestamp_null(Accounts::RefreshTokenExpiresAt))
                    .col(text_null(Accounts::Scope))
                    .col(text_null(Accounts::Password))
                    .col(timestamp(Accounts::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Accounts::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_accounts_user")
                            .from(Accounts::Table, Accounts::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create verifications table; timestamps deliberately nullable without default
        manager
            .create_table(
                Table::create()
                    .table(Verifications::Table)
                    .if_not_exists()
                    .col(text(Verifications::Id).primary_key())
                    .col(text(Verifications::Identifier))
                    .col(text(Verifications::Value))
                    .col(timestamp(Verifications::ExpiresAt))
                    .col(timestamp_null(Verifications::CreatedAt))
                    .col(timestamp_null(Verifications::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Create affiliates table
        manager
            .create_table(
                Table::create()
                    .table(Affiliates::Table)
                    .if_not_exists()
                    .col(text(Affiliates::Id).primary_key())
                    .col(text(Affiliates::Login).unique_key())
                    .col(text(Affiliates::Password))
                    .col(timestamp(Affiliates::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Affiliates::UpdatedAt).default(Expr::current_timestamp()))
                    .col(text_null(Affiliates::Info))
                    .col(text_null(Affiliates::PayoutCryptoCurrency))
                    .col(text_null(Affiliates::PayoutCryptoAddress))
                    .to_owned(),
            )
            .await?;

        // Create affiliate_links table
        manager
            .create_table(
                Table::create()
                    .table(AffiliateLinks::Table)
                    .if_not_exists()
                    .col(text(AffiliateLinks::Id).primary_key())
                    .col(text(AffiliateLinks::AffiliateId))
                    .col(text(AffiliateLinks::Code).unique_key())
                    .col(integer(AffiliateLinks::Clicks).default(0))
                    .col(integer(AffiliateLinks::Signups).default(0))
                    .col(integer(AffiliateLinks::Sales).default(0))
                    .col(decimal(AffiliateLinks::Earnings).decimal_len(12, 2).default(0))
                    .col(string_len(AffiliateLinks::Status, 20).default("active"))
                    .col(timestamp(AffiliateLinks::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(AffiliateLinks::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_affiliate_links_affiliate")
                            .from(AffiliateLinks::Table, AffiliateLinks::AffiliateId)
                            .to(Affiliates::Table, Affiliates::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create affiliate_payouts table
        manager
            .create_table(
                Table::create()
                    .table(AffiliatePayouts::Table)
                    .if_not_exists()
                    .col(text(AffiliatePayouts::Id).primary_key())
                    .col(text(AffiliatePayouts::AffiliateId))
                    .col(decimal(AffiliatePayouts::Amount).decimal_len(12, 2))
                    .col(string_len(AffiliatePayouts::CryptoUsed, 20))
                    .col(text_null(AffiliatePayouts::CryptoTransactionHash))
                    .col(string_len(AffiliatePayouts::Status, 20).default("pending"))
                    .col(timestamp_null(AffiliatePayouts::PayoutAt))
                    .col(timestamp(AffiliatePayouts::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(AffiliatePayouts::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_affiliate_payouts_affiliate")
                            .from(AffiliatePayouts::Table, AffiliatePayouts::AffiliateId)
                            .to(Affiliates::Table, Affiliates::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(AffiliatePayouts::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AffiliateLinks::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Affiliates::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Verifications::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Generations::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(GenerationInputs::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

// Define identifiers for all tables

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    EmailVerified,
    Username,
    Tokens,
    UnlimitedTokensEndDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GenerationInputs {
    Table,
    Id,
    UserId,
    Type,
    Prompt,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Generations {
    Table,
    Id,
    UserId,
    GenerationInputId,
    Model,
    Status,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    UserId,
    Service,
    PurchaseCostInCents,
    MethodOfPurchase,
    CryptoTransactionHash,
    TokensAmountBought,
    PaymentStatus,
    PaidAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Sessions {
    Table,
    Id,
    UserId,
    Token,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
    IpAddress,
    UserAgent,
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    UserId,
    AccountId,
    ProviderId,
    AccessToken,
    RefreshToken,
    IdToken,
    AccessTokenExpiresAt,
    RefreshTokenExpiresAt,
    Scope,
    Password,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Verifications {
    Table,
    Id,
    Identifier,
    Value,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Affiliates {
    Table,
    Id,
    Login,
    Password,
    CreatedAt,
    UpdatedAt,
    Info,
    PayoutCryptoCurrency,
    PayoutCryptoAddress,
}

#[derive(DeriveIden)]
enum AffiliateLinks {
    Table,
    Id,
    AffiliateId,
    Code,
    Clicks,
    Signups,
    Sales,
    Earnings,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AffiliatePayouts {
    Table,
    Id,
    AffiliateId,
    Amount,
    CryptoUsed,
    CryptoTransactionHash,
    Status,
    PayoutAt,
    CreatedAt,
    UpdatedAt,
}
