//! Pricing Engine
//!
//! Maps a cart and the express flag to a quote. The function is pure: no
//! I/O, no mutation, and identical inputs give identical output.

use super::{
    helpers::round_currency,
    models::{PricedLine, PricingConfig, PricingError, PricingResult},
};
use crate::{cart::models::Cart, catalog::Catalog};
use rust_decimal::Decimal;

/// Prices `cart` against `catalog`.
///
/// * Express adds `config.express_surcharge` to every piece's unit price.
/// * Delivery is free for an empty cart or when the base total reaches the
///   threshold; otherwise it is the flat fee. There are no tiers.
///
/// Fails with [`PricingError::ItemNotFound`] if a cart line is missing from
/// the catalog instead of silently skipping it.
pub fn price(
    cart: &Cart,
    express: bool,
    catalog: &Catalog,
    config: &PricingConfig,
) -> Result<PricingResult, PricingError> {
    let surcharge = if express {
        config.express_surcharge
    } else {
        Decimal::ZERO
    };

    let mut lines = Vec::with_capacity(cart.total_lines());
    let mut base_total = Decimal::ZERO;
    let mut total_items: u64 = 0;

    for (item_id, quantity) in cart.iter() {
        if quantity == 0 {
            continue;
        }
        let item = catalog
            .get(item_id)
            .ok_or_else(|| PricingError::ItemNotFound(item_id.to_string()))?;

        let unit_price = item.base_price + surcharge;
        let line_total = unit_price * Decimal::from(quantity);
        base_total += line_total;
        total_items += u64::from(quantity);

        lines.push(PricedLine {
            item_id: item.id.clone(),
            name: item.name.clone(),
            quantity,
            unit_price: round_currency(unit_price),
            line_total: round_currency(line_total),
        });
    }

    let base_total = round_currency(base_total);
    let qualifies = base_total >= config.free_delivery_threshold;
    let delivery_fee = if base_total.is_zero() || qualifies {
        Decimal::ZERO
    } else {
        config.flat_delivery_fee
    };
    let amount_to_free_delivery = if qualifies {
        Decimal::ZERO
    } else {
        config.free_delivery_threshold - base_total
    };

    Ok(PricingResult {
        lines,
        express,
        total_items,
        base_total,
        delivery_fee: round_currency(delivery_fee),
        final_total: round_currency(base_total + delivery_fee),
        express_surcharge_total: round_currency(surcharge * Decimal::from(total_items)),
        qualifies_for_free_delivery: qualifies,
        amount_to_free_delivery: round_currency(amount_to_free_delivery),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{fallback::fallback_items, CatalogItem, Category};
    use rust_decimal_macros::dec;

    const DRESS_SHIRT: &str = "m-f-1";

    fn catalog() -> Catalog {
        Catalog::new(fallback_items())
    }

    fn cart_with(catalog: &Catalog, lines: &[(&str, u32)]) -> Cart {
        let mut cart = Cart::new();
        for (id, quantity) in lines {
            cart.set_quantity(catalog, id, *quantity).unwrap();
        }
        cart
    }

    #[test]
    fn two_dress_shirts_pay_the_delivery_fee() {
        let catalog = catalog();
        let cart = cart_with(&catalog, &[(DRESS_SHIRT, 2)]);
        let quote = price(&cart, false, &catalog, &PricingConfig::default()).unwrap();

        assert_eq!(quote.base_total, dec!(7.00));
        assert_eq!(quote.delivery_fee, dec!(5.00));
        assert_eq!(quote.final_total, dec!(12.00));
        assert_eq!(quote.total_items, 2);
        assert_eq!(quote.amount_to_free_delivery, dec!(28.00));
    }

    #[test]
    fn ten_dress_shirts_ship_free() {
        let catalog = catalog();
        let cart = cart_with(&catalog, &[(DRESS_SHIRT, 10)]);
        let quote = price(&cart, false, &catalog, &PricingConfig::default()).unwrap();

        assert_eq!(quote.base_total, dec!(35.00));
        assert_eq!(quote.delivery_fee, dec!(0.00));
        assert_eq!(quote.final_total, dec!(35.00));
        assert!(quote.qualifies_for_free_delivery);
    }

    #[test]
    fn express_adds_a_per_piece_surcharge() {
        let catalog = catalog();
        let cart = cart_with(&catalog, &[(DRESS_SHIRT, 2)]);
        let quote = price(&cart, true, &catalog, &PricingConfig::default()).unwrap();

        assert_eq!(quote.base_total, dec!(9.00));
        assert_eq!(quote.delivery_fee, dec!(5.00));
        assert_eq!(quote.final_total, dec!(14.00));
        assert_eq!(quote.lines[0].unit_price, dec!(4.50));
    }

    #[test]
    fn express_difference_is_surcharge_times_items() {
        let catalog = catalog();
        let config = PricingConfig::default();
        let cart = cart_with(&catalog, &[("w-e-1", 1), ("h-b-5", 4), ("m-c-1", 3)]);

        let standard = price(&cart, false, &catalog, &config).unwrap();
        let express = price(&cart, true, &catalog, &config).unwrap();

        assert_eq!(
            express.base_total,
            standard.base_total + config.express_surcharge * Decimal::from(standard.total_items)
        );
        assert_eq!(express.express_surcharge_total, dec!(8.00));
    }

    #[test]
    fn empty_cart_is_free() {
        let catalog = catalog();
        let quote = price(&Cart::new(), true, &catalog, &PricingConfig::default()).unwrap();

        assert_eq!(quote.base_total, Decimal::ZERO);
        assert_eq!(quote.delivery_fee, Decimal::ZERO);
        assert_eq!(quote.final_total, Decimal::ZERO);
        assert!(quote.is_empty());
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let catalog = Catalog::new(vec![
            CatalogItem::new("exact", "Exact", Category::HouseholdMiscellaneous, dec!(35.00)),
            CatalogItem::new("short", "Short", Category::HouseholdMiscellaneous, dec!(34.99)),
        ]);
        let config = PricingConfig::default();

        let at = price(&cart_with(&catalog, &[("exact", 1)]), false, &catalog, &config).unwrap();
        assert_eq!(at.delivery_fee, Decimal::ZERO);

        let below = price(&cart_with(&catalog, &[("short", 1)]), false, &catalog, &config).unwrap();
        assert_eq!(below.delivery_fee, config.flat_delivery_fee);
        assert_eq!(below.amount_to_free_delivery, dec!(0.01));
    }

    #[test]
    fn pricing_is_deterministic() {
        let catalog = catalog();
        let config = PricingConfig::default();
        let cart = cart_with(&catalog, &[("w-b-3", 2), ("m-o-2", 1), ("h-wt-3", 1)]);

        let first = price(&cart, true, &catalog, &config).unwrap();
        let second = price(&cart, true, &catalog, &config).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert!(first.base_total >= Decimal::ZERO);
    }

    #[test]
    fn diverged_catalog_is_reported() {
        let full = catalog();
        let cart = cart_with(&full, &[("h-m-2", 1)]);
        let reduced = Catalog::new(
            fallback_items()
                .into_iter()
                .filter(|item| item.id != "h-m-2"),
        );

        let err = price(&cart, false, &reduced, &PricingConfig::default()).unwrap_err();
        assert_eq!(err, PricingError::ItemNotFound("h-m-2".into()));
    }

    #[test]
    fn alternative_fee_schedule_is_configuration() {
        let catalog = catalog();
        let config = PricingConfig::new(dec!(30), dec!(4.99), dec!(1.00)).unwrap();
        let cart = cart_with(&catalog, &[(DRESS_SHIRT, 2)]);
        let quote = price(&cart, false, &catalog, &config).unwrap();

        assert_eq!(quote.delivery_fee, dec!(4.99));
        assert_eq!(quote.final_total, dec!(11.99));
        assert!(PricingConfig::new(dec!(-1), dec!(5), dec!(1)).is_err());
    }
}

#[cfg(test)]
mod properties {
    use super::*;
    use crate::catalog::fallback::fallback_items;
    use proptest::prelude::*;

    fn build_cart(catalog: &Catalog, picks: &[(usize, u32)]) -> Cart {
        let mut cart = Cart::new();
        for &(index, quantity) in picks {
            let item = &catalog.items()[index % catalog.len()];
            cart.set_quantity(catalog, &item.id, quantity).unwrap();
        }
        cart
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn quotes_are_deterministic_and_consistent(
            picks in prop::collection::vec((0usize..64, 0u32..25), 0..12),
            express in any::<bool>(),
        ) {
            let catalog = Catalog::new(fallback_items());
            let config = PricingConfig::default();
            let cart = build_cart(&catalog, &picks);

            let quote = price(&cart, express, &catalog, &config).unwrap();
            prop_assert_eq!(&quote, &price(&cart, express, &catalog, &config).unwrap());

            prop_assert!(quote.base_total >= Decimal::ZERO);
            prop_assert_eq!(quote.final_total, quote.base_total + quote.delivery_fee);
            prop_assert_eq!(quote.total_items, cart.total_items());

            let free = cart.is_empty() || quote.base_total >= config.free_delivery_threshold;
            if free {
                prop_assert_eq!(quote.delivery_fee, Decimal::ZERO);
            } else {
                prop_assert_eq!(quote.delivery_fee, config.flat_delivery_fee);
            }
        }

        #[test]
        fn express_adds_the_surcharge_per_piece(
            picks in prop::collection::vec((0usize..64, 0u32..25), 0..12),
        ) {
            let catalog = Catalog::new(fallback_items());
            let config = PricingConfig::default();
            let cart = build_cart(&catalog, &picks);

            let standard = price(&cart, false, &catalog, &config).unwrap();
            let express = price(&cart, true, &catalog, &config).unwrap();

            prop_assert_eq!(
                express.base_total - standard.base_total,
                config.express_surcharge * Decimal::from(cart.total_items())
            );
            prop_assert_eq!(express.express_surcharge_total, express.base_total - standard.base_total);
        }
    }
}
