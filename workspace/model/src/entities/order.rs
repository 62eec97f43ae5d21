use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use thiserror::Error;

use super::user;

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum PurchaseMethod {
    #[sea_orm(string_value = "crypto-ton")]
    CryptoTon,
    #[sea_orm(string_value = "crypto-sol")]
    CryptoSol,
    #[sea_orm(string_value = "fiat")]
    Fiat,
}

/// Outcome of the payment behind an order.
///
/// Stored as free text so that a failure can carry its reason:
/// `pending`, `paid`, `failed` or `failed: <reason>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed { reason: Option<String> },
}

const FAILED_PREFIX: &str = "failed";

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Paid => f.write_str("paid"),
            Self::Failed { reason: None } => f.write_str(FAILED_PREFIX),
            Self::Failed { reason: Some(reason) } => write!(f, "{FAILED_PREFIX}: {reason}"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown payment status '{0}'")]
pub struct PaymentStatusParseError(pub String);

impl FromStr for PaymentStatus {
    type Err = PaymentStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            FAILED_PREFIX => Ok(Self::Failed { reason: None }),
            other => match other
                .strip_prefix(FAILED_PREFIX)
                .and_then(|rest| rest.strip_prefix(':'))
            {
                Some(reason) => {
                    let reason = reason.trim();
                    // "failed:" with nothing after it is still a bare failure
                    Ok(Self::Failed {
                        reason: (!reason.is_empty()).then(|| reason.to_string()),
                    })
                }
                None => Err(PaymentStatusParseError(other.to_string())),
            },
        }
    }
}

/// A token-purchase transaction.
///
/// `tokens_amount_bought` and `paid_at` are only expected once the payment is
/// confirmed; nothing in the table couples them to `payment_status`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    /// Product or brand the order was sold through.
    pub service: String,
    pub purchase_cost_in_cents: i32,
    pub method_of_purchase: PurchaseMethod,
    pub crypto_transaction_hash: Option<String>,
    pub tokens_amount_bought: Option<i32>,
    pub payment_status: Option<String>,
    pub paid_at: Option<NaiveDateTime>,
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
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parses the stored payment status. `None` when the column is null.
    pub fn payment_status(&self) -> Result<Option<PaymentStatus>, PaymentStatusParseError> {
        self.payment_status.as_deref().map(str::parse).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_status_text_is_stable() {
        assert_eq!(PaymentStatus::Pending.to_string(), "pending");
        assert_eq!(PaymentStatus::Paid.to_string(), "paid");
        assert_eq!(PaymentStatus::Failed { reason: None }.to_string(), "failed");
        assert_eq!(
            PaymentStatus::Failed { reason: Some("card declined".into()) }.to_string(),
            "failed: card declined"
        );
    }

    #[test]
    fn failed_status_keeps_reason() {
        let parsed: PaymentStatus = "failed: insufficient funds".parse().unwrap();
        assert_eq!(
            parsed,
            PaymentStatus::Failed { reason: Some("insufficient funds".to_string()) }
        );

        let bare: PaymentStatus = "failed:".parse().unwrap();
        assert_eq!(bare, PaymentStatus::Failed { reason: None });
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "refunded".parse::<PaymentStatus>().unwrap_err();
        assert_eq!(err, PaymentStatusParseError("refunded".to_string()));
    }
}
