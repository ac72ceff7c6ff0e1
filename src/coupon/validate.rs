//! Coupon validation
//!
//! Checks run in a fixed order and the first failure wins. Validation never
//! mutates the coupon; usage is recorded separately once payment succeeds.

use super::{
    models::{normalize_code, Coupon, CouponApplication, CouponType},
    store::CouponStore,
};
use crate::pricing::helpers::{format_amount, round_currency};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, error};

/// Reasons a coupon cannot be applied. All are non-fatal to checkout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    /// Unknown or inactive; the two are deliberately indistinguishable
    #[error("Invalid coupon code")]
    InvalidCode,

    #[error("Coupon has expired")]
    Expired,

    #[error("Coupon usage limit reached")]
    UsageLimitReached,

    #[error("Minimum order amount of {} required", format_amount(*minimum))]
    MinimumNotMet { minimum: Decimal },

    /// The coupon backend could not be consulted
    #[error("Coupon validation not available")]
    Unavailable,
}

/// Discount for `coupon` on `order_subtotal`, capped at the subtotal.
pub fn compute_discount(coupon: &Coupon, order_subtotal: Decimal) -> Decimal {
    let subtotal = order_subtotal.max(Decimal::ZERO);
    let raw = match coupon.coupon_type {
        CouponType::Percentage => subtotal * coupon.value / Decimal::ONE_HUNDRED,
        CouponType::Fixed => coupon.value,
    };
    round_currency(raw.max(Decimal::ZERO).min(subtotal))
}

/// Applies the validation rules to an already looked-up coupon.
///
/// `found` is the result of the case-insensitive lookup.
pub fn check_coupon(
    found: Option<&Coupon>,
    order_subtotal: Decimal,
    now: DateTime<Utc>,
) -> Result<CouponApplication, CouponError> {
    let coupon = found.ok_or(CouponError::InvalidCode)?;
    if !coupon.is_active {
        return Err(CouponError::InvalidCode);
    }
    if coupon.is_expired(now) {
        return Err(CouponError::Expired);
    }
    if coupon.is_exhausted() {
        return Err(CouponError::UsageLimitReached);
    }
    if order_subtotal < coupon.min_order_amount {
        return Err(CouponError::MinimumNotMet {
            minimum: coupon.min_order_amount,
        });
    }

    Ok(CouponApplication {
        coupon: coupon.clone(),
        order_subtotal,
        discount_amount: compute_discount(coupon, order_subtotal),
    })
}

/// Looks `code` up in `store` and validates it against `order_subtotal`.
pub async fn validate(
    code: &str,
    order_subtotal: Decimal,
    now: DateTime<Utc>,
    store: &dyn CouponStore,
) -> Result<CouponApplication, CouponError> {
    let code = normalize_code(code);
    if code.is_empty() {
        return Err(CouponError::InvalidCode);
    }

    let found = store.find_by_code(&code).await.map_err(|err| {
        error!(%err, "coupon lookup failed");
        CouponError::Unavailable
    })?;

    let result = check_coupon(found.as_ref(), order_subtotal, now);
    debug!(code = %code, %order_subtotal, ok = result.is_ok(), "validated coupon");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupon::store::InMemoryCouponStore;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn twenty_percent_off_thirty_five() {
        let coupon = Coupon::new("FB20", CouponType::Percentage, dec!(20));
        let applied = check_coupon(Some(&coupon), dec!(35.00), now()).unwrap();
        assert_eq!(applied.discount_amount, dec!(7.00));
    }

    #[test]
    fn discount_never_exceeds_subtotal() {
        let fixed = Coupon::new("BIG", CouponType::Fixed, dec!(50));
        assert_eq!(compute_discount(&fixed, dec!(12.00)), dec!(12.00));

        let over = Coupon::new("OVER", CouponType::Percentage, dec!(150));
        assert_eq!(compute_discount(&over, dec!(12.00)), dec!(12.00));

        let small = Coupon::new("FIVE", CouponType::Fixed, dec!(5));
        assert_eq!(compute_discount(&small, dec!(12.00)), dec!(5.00));
    }

    #[test]
    fn percentage_discount_is_rounded_to_cents() {
        let coupon = Coupon::new("TEN", CouponType::Percentage, dec!(10));
        assert_eq!(compute_discount(&coupon, dec!(12.35)), dec!(1.24));
    }

    #[test]
    fn checks_short_circuit_in_order() {
        let mut coupon = Coupon::new("MANY", CouponType::Fixed, dec!(5))
            .with_minimum(dec!(100))
            .with_usage_limit(1)
            .expiring_at(now() - Duration::days(1));
        coupon.used_count = 1;
        coupon.is_active = false;

        assert_eq!(check_coupon(Some(&coupon), dec!(1), now()), Err(CouponError::InvalidCode));
        coupon.is_active = true;
        assert_eq!(check_coupon(Some(&coupon), dec!(1), now()), Err(CouponError::Expired));
        coupon.expires_at = None;
        assert_eq!(
            check_coupon(Some(&coupon), dec!(1), now()),
            Err(CouponError::UsageLimitReached)
        );
        coupon.used_count = 0;
        assert_eq!(
            check_coupon(Some(&coupon), dec!(1), now()),
            Err(CouponError::MinimumNotMet { minimum: dec!(100) })
        );
        assert!(check_coupon(Some(&coupon), dec!(100), now()).is_ok());
    }

    #[test]
    fn minimum_message_names_the_amount() {
        let err = CouponError::MinimumNotMet { minimum: dec!(25) };
        assert_eq!(err.to_string(), "Minimum order amount of $25.00 required");
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive_and_repeatable() {
        let store = InMemoryCouponStore::new(vec![Coupon::new(
            "fb20",
            CouponType::Percentage,
            dec!(20),
        )]);

        let first = validate("  Fb20 ", dec!(35.00), now(), &store).await.unwrap();
        let second = validate("FB20", dec!(35.00), now(), &store).await.unwrap();
        assert_eq!(first.discount_amount, second.discount_amount);
        assert_eq!(first.coupon.code, "FB20");
    }

    #[tokio::test]
    async fn unknown_and_expired_codes_fail() {
        let store = InMemoryCouponStore::new(vec![Coupon::new(
            "OLD",
            CouponType::Fixed,
            dec!(5),
        )
        .expiring_at(now() - Duration::hours(1))]);

        assert_eq!(
            validate("NOPE", dec!(35), now(), &store).await,
            Err(CouponError::InvalidCode)
        );
        assert_eq!(
            validate("old", dec!(35), now(), &store).await,
            Err(CouponError::Expired)
        );
        assert_eq!(validate("", dec!(35), now(), &store).await, Err(CouponError::InvalidCode));
    }
}
