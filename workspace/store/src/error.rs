use common::MoneyError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::{debug, error};

/// Failures surfaced by the store.
///
/// Constraint failures are split by kind so callers can tell a duplicate key
/// from a dangling reference or an unreachable database.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique or primary-key constraint failed
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// A foreign key points nowhere, or a parent is still referenced
    #[error("Referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    /// A required column was null
    #[error("Not-null constraint failed: {0}")]
    NotNull(String),

    /// The database could not be reached
    #[error("Database unavailable: {0}")]
    Connection(String),

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// A value was rejected before reaching the database
    #[error("Invalid value: {0}")]
    Validation(String),

    /// Anything the engine reported that fits none of the above
    #[error("Database error: {0}")]
    Database(DbErr),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Classifies an engine error.
    ///
    /// sea-orm recognises unique and foreign-key violations for every backend;
    /// the message checks cover not-null failures and drivers it misses.
    pub fn from_db(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => return Self::Duplicate(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                return Self::ReferentialIntegrity(msg);
            }
            _ => {}
        }

        let classified = match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::Connection(err.to_string()),
            DbErr::RecordNotFound(what) => Self::NotFound {
                entity: "record",
                id: what,
            },
            other => {
                let msg = other.to_string();
                let lower = msg.to_lowercase();
                if lower.contains("unique constraint") || lower.contains("duplicate key") {
                    Self::Duplicate(msg)
                } else if lower.contains("foreign key constraint") {
                    Self::ReferentialIntegrity(msg)
                } else if lower.contains("not null constraint") || lower.contains("not-null constraint") {
                    Self::NotNull(msg)
                } else if lower.contains("connection refused") || lower.contains("pool timed out") {
                    Self::Connection(msg)
                } else {
                    Self::Database(other)
                }
            }
        };

        match &classified {
            Self::Database(e) => error!(error = %e, "unclassified database error"),
            Self::Connection(e) => error!(error = %e, "database connection failure"),
            other => debug!(error = %other, "database rejected write"),
        }
        classified
    }

    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Duplicate(_) => "DUPLICATE_KEY",
            Self::ReferentialIntegrity(_) => "REFERENTIAL_INTEGRITY",
            Self::NotNull(_) => "NOT_NULL_VIOLATION",
            Self::Connection(_) => "DATABASE_UNAVAILABLE",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        Self::from_db(err)
    }
}

impl From<MoneyError> for StoreError {
    fn from(err: MoneyError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Type alias for Result with StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_messages_are_classified() {
        let unique = StoreError::from_db(DbErr::Custom(
            "UNIQUE constraint failed: users.email".to_string(),
        ));
        assert!(matches!(unique, StoreError::Duplicate(_)));

        let foreign = StoreError::from_db(DbErr::Custom(
            "insert or update on table \"generations\" violates foreign key constraint".to_string(),
        ));
        assert!(matches!(foreign, StoreError::ReferentialIntegrity(_)));

        let not_null = StoreError::from_db(DbErr::Custom(
            "NOT NULL constraint failed: orders.service".to_string(),
        ));
        assert!(matches!(not_null, StoreError::NotNull(_)));

        let other = StoreError::from_db(DbErr::Custom("disk I/O error".to_string()));
        assert!(matches!(other, StoreError::Database(_)));
        assert_eq!(other.code(), "DATABASE_ERROR");
    }

    #[test]
    fn money_errors_are_validation_errors() {
        let err: StoreError = MoneyError::TooPrecise(rust_decimal::Decimal::new(1234, 3)).into();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}
