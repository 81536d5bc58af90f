//! Money helpers
//!
//! Prices travel as `f64` on the wire and in storage; arithmetic is done in
//! `Decimal` and rounded back to 2 decimal places, half away from zero.

use rust_decimal::prelude::*;

use crate::error::{AppError, ErrorCode};

const DECIMAL_PLACES: u32 = 2;

/// Maximum accepted unit price or bid
pub const MAX_PRICE: f64 = 1_000_000_000.0;
/// Maximum accepted quantity per order
pub const MAX_QUANTITY: u32 = 9999;

#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

#[inline]
pub fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round(value).to_f64().unwrap_or_default()
}

/// `unit_price * quantity`, rounded
pub fn line_total(unit_price: f64, quantity: u32) -> Result<f64, AppError> {
    to_decimal(unit_price)
        .checked_mul(Decimal::from(quantity))
        .map(to_f64)
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("order total out of range: {unit_price} x {quantity}"),
            )
        })
}

/// Whether `value` is a usable positive amount, at most [`MAX_PRICE`]
pub fn is_valid_amount(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value <= MAX_PRICE
}

/// Whether `quantity` is within `1..=MAX_QUANTITY`
pub fn is_valid_quantity(quantity: u32) -> bool {
    (1..=MAX_QUANTITY).contains(&quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_avoid_float_drift() {
        assert_eq!(line_total(0.1, 3).unwrap(), 0.3);
        assert_eq!(line_total(19.99, 2).unwrap(), 39.98);
    }

    #[test]
    fn line_total_reports_overflow() {
        let err = line_total(1e20, u32::MAX).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert_eq!(line_total(MAX_PRICE, MAX_QUANTITY).unwrap(), 9_999_000_000_000.0);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(to_f64(Decimal::new(1005, 3)), 1.01);
        assert_eq!(to_f64(Decimal::new(1004, 3)), 1.0);
    }

    #[test]
    fn amount_validity() {
        assert!(is_valid_amount(0.01));
        assert!(!is_valid_amount(0.0));
        assert!(!is_valid_amount(-5.0));
        assert!(!is_valid_amount(f64::NAN));
        assert!(!is_valid_amount(f64::INFINITY));
        assert!(is_valid_amount(MAX_PRICE));
        assert!(!is_valid_amount(MAX_PRICE + 1.0));
        // Beyond Decimal's range
        assert!(!is_valid_amount(1e30));
    }

    #[test]
    fn quantity_bounds() {
        assert!(!is_valid_quantity(0));
        assert!(is_valid_quantity(1));
        assert!(is_valid_quantity(MAX_QUANTITY));
        assert!(!is_valid_quantity(MAX_QUANTITY + 1));
    }
}
