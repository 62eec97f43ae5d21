//! Fixed-precision monetary amounts, `numeric(12, 2)` on the wire.
//!
//! Amounts stay in `Decimal` end to end. Values are validated before they are
//! written and rescaled after they are read, so engines that do not keep the
//! declared scale (SQLite) still hand back exactly two decimal places.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

/// Total significant digits of a stored amount.
pub const MONEY_PRECISION: u32 = 12;
/// Digits after the decimal point.
pub const MONEY_SCALE: u32 = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("amount {0} has more than 2 decimal places")]
    TooPrecise(Decimal),

    #[error("amount {0} does not fit in 10 integer digits")]
    TooLarge(Decimal),
}

/// Largest magnitude (exclusive) that fits the integer part.
fn integer_limit() -> Decimal {
    Decimal::from(10_i64.pow(MONEY_PRECISION - MONEY_SCALE))
}

/// Validates `value` for storage and returns it at scale 2.
///
/// Amounts are never rounded here: a third significant decimal is an error.
pub fn checked(value: Decimal) -> Result<Decimal, MoneyError> {
    let mut normalized = value.normalize();
    if normalized.scale() > MONEY_SCALE {
        warn!(%value, "rejecting amount with excess precision");
        return Err(MoneyError::TooPrecise(value));
    }
    if normalized.abs() >= integer_limit() {
        warn!(%value, "rejecting amount larger than the column allows");
        return Err(MoneyError::TooLarge(value));
    }
    normalized.rescale(MONEY_SCALE);
    Ok(normalized)
}

/// Adds two amounts, keeping the result storable.
pub fn add(a: Decimal, b: Decimal) -> Result<Decimal, MoneyError> {
    let sum = a.checked_add(b).ok_or(MoneyError::TooLarge(a))?;
    checked(sum)
}

/// Brings a value read back from the database to scale 2.
pub fn from_storage(value: Decimal) -> Decimal {
    let mut value = value.round_dp(MONEY_SCALE);
    value.rescale(MONEY_SCALE);
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn accepts_ten_integer_digits_and_two_decimals() {
        let value = checked(d("1234567890.12")).unwrap();
        assert_eq!(value.to_string(), "1234567890.12");
        assert_eq!(value.scale(), MONEY_SCALE);
    }

    #[test]
    fn pads_to_two_decimals() {
        assert_eq!(checked(d("5")).unwrap().to_string(), "5.00");
        assert_eq!(checked(d("0.1")).unwrap().to_string(), "0.10");
        // Trailing zeros beyond the scale are not significant
        assert_eq!(checked(d("7.5000")).unwrap().to_string(), "7.50");
    }

    #[test]
    fn rejects_third_decimal() {
        assert_eq!(checked(d("1.234")), Err(MoneyError::TooPrecise(d("1.234"))));
    }

    #[test]
    fn rejects_eleven_integer_digits() {
        assert_eq!(
            checked(d("12345678901.00")),
            Err(MoneyError::TooLarge(d("12345678901.00")))
        );
        assert!(checked(d("-9999999999.99")).is_ok());
    }

    #[test]
    fn sums_exactly() {
        // 0.1 + 0.2 is exact in decimal arithmetic
        assert_eq!(add(d("0.1"), d("0.2")).unwrap(), d("0.30"));
        assert!(add(d("9999999999.99"), d("0.01")).is_err());
    }

    #[test]
    fn storage_values_come_back_at_scale_two() {
        // What a float-backed engine may return for 1234567890.12
        let drifted = d("1234567890.1199998856");
        assert_eq!(from_storage(drifted).to_string(), "1234567890.12");
        assert_eq!(from_storage(d("3")).to_string(), "3.00");
    }
}
