//! Currency rounding helpers.
//!
//! Amounts are rounded half away from zero, the same rule the payment
//! processor's client applies when converting to cents.

use super::models::PricingError;
use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};

/// Rounds to cents and pins the scale to exactly two digits ("7.00", not "7").
pub fn round_currency(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Converts an amount to integer cents for the payment processor.
pub fn to_minor_units(amount: Decimal) -> Result<i64, PricingError> {
    round_currency(amount)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or(PricingError::AmountOutOfRange(amount))
}

/// Formats an amount the way customers see it, e.g. `$35.00`.
pub fn format_amount(amount: Decimal) -> String {
    format!("${}", round_currency(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_away_from_zero_with_two_digits() {
        assert_eq!(round_currency(dec!(1.005)).to_string(), "1.01");
        assert_eq!(round_currency(dec!(1.004)).to_string(), "1.00");
        assert_eq!(round_currency(dec!(7)).to_string(), "7.00");
        assert_eq!(round_currency(Decimal::ZERO).to_string(), "0.00");
    }

    #[test]
    fn minor_units_are_integer_cents() {
        assert_eq!(to_minor_units(dec!(40.25)).unwrap(), 4025);
        assert_eq!(to_minor_units(dec!(12.345)).unwrap(), 1235);
        assert_eq!(to_minor_units(Decimal::ZERO).unwrap(), 0);
        assert!(to_minor_units(Decimal::MAX).is_err());
    }

    #[test]
    fn amounts_format_with_dollar_sign() {
        assert_eq!(format_amount(dec!(35)), "$35.00");
    }
}
