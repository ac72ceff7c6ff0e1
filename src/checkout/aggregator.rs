//! Checkout Aggregator
//!
//! Combines the quote, tip and coupon discount into the one amount that is
//! charged and recorded.

use super::models::FinalCheckoutAmount;
use crate::pricing::{
    helpers::{round_currency, to_minor_units},
    models::CURRENCY,
    PricingError, PricingResult,
};
use rust_decimal::Decimal;

/// `max(0, base_total + delivery_fee + tip − discount)`, rounded to cents.
pub fn finalize(
    pricing: &PricingResult,
    tip_amount: Decimal,
    discount_amount: Decimal,
) -> Result<FinalCheckoutAmount, PricingError> {
    let gross = pricing.base_total + pricing.delivery_fee + tip_amount;
    let final_total = round_currency((gross - discount_amount).max(Decimal::ZERO));

    Ok(FinalCheckoutAmount {
        base_total: round_currency(pricing.base_total),
        delivery_fee: round_currency(pricing.delivery_fee),
        tip_amount: round_currency(tip_amount),
        discount_amount: round_currency(discount_amount),
        amount_minor_units: to_minor_units(final_total)?,
        final_total,
        currency: CURRENCY.to_string(),
    })
}


#[cfg(test)]
mod properties {
    use super::*;
    use crate::{
        cart::models::Cart,
        catalog::{fallback::fallback_items, Catalog},
        coupon::{compute_discount, Coupon, CouponType},
        pricing::{compute_tip, price, PricingConfig, TipPercentage},
    };
    use proptest::prelude::*;

    fn coupon_strategy() -> impl Strategy<Value = Option<Coupon>> {
        prop_oneof![
            Just(None),
            (0u32..=100).prop_map(|percent| Some(Coupon::new(
                "PCT",
                CouponType::Percentage,
                Decimal::from(percent)
            ))),
            (0i64..20_000).prop_map(|cents| Some(Coupon::new(
                "FIXED",
                CouponType::Fixed,
                Decimal::new(cents, 2)
            ))),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn final_amount_never_goes_negative(
            picks in prop::collection::vec((0usize..64, 1u32..25), 0..10),
            express in any::<bool>(),
            tip in prop::sample::select(TipPercentage::MENU.to_vec()),
            coupon in coupon_strategy(),
        ) {
            let catalog = Catalog::new(fallback_items());
            let mut cart = Cart::new();
            for &(index, quantity) in &picks {
                let item = &catalog.items()[index % catalog.len()];
                cart.set_quantity(&catalog, &item.id, quantity).unwrap();
            }
            let pricing = price(&cart, express, &catalog, &PricingConfig::default()).unwrap();

            let subtotal = pricing.subtotal_with_delivery();
            let tip_amount = compute_tip(pricing.base_total, pricing.delivery_fee, tip);
            let discount = coupon
                .as_ref()
                .map_or(Decimal::ZERO, |c| compute_discount(c, subtotal));
            prop_assert!(discount >= Decimal::ZERO);
            prop_assert!(discount <= subtotal);

            let amount = finalize(&pricing, tip_amount, discount).unwrap();
            prop_assert!(amount.final_total >= Decimal::ZERO);
            prop_assert_eq!(
                amount.final_total,
                (subtotal + tip_amount - discount).max(Decimal::ZERO)
            );
            prop_assert_eq!(
                Decimal::from(amount.amount_minor_units),
                amount.final_total * Decimal::ONE_HUNDRED
            );
        }
    }
}
