//! Shopping Cart Business Logic Helpers
//!
//! This module contains helper functions for cart identifiers and formatting.

use super::models::Cart;
use crate::catalog::Catalog;
use uuid::Uuid;

/// Returns the provided `cart_id` or creates a new UUID string when `None`.
///
/// This guarantees that every cart operation works with a non-empty identifier.
pub fn get_or_create_cart_id(cart_id: Option<String>) -> String {
    cart_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string())
}

/// Produces a human-readable one-line summary of a cart.
///
/// Example output: `"2x Dress shirts (short or long sleeve), 1x Ties"`.
/// Lines whose id is missing from the catalog are shown by id.
pub fn format_item_summary(cart: &Cart, catalog: &Catalog) -> String {
    cart.iter()
        .map(|(id, quantity)| {
            let name = catalog.get(id).map(|i| i.name.as_str()).unwrap_or(id);
            format!("{}x {}", quantity, name)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fallback::fallback_items;

    #[test]
    fn missing_or_blank_ids_get_generated() {
        assert_eq!(get_or_create_cart_id(Some("abc".into())), "abc");
        assert_eq!(get_or_create_cart_id(None).len(), 32);
        assert_ne!(get_or_create_cart_id(Some("  ".into())), "  ");
    }

    #[test]
    fn summary_lists_quantity_and_name() {
        let catalog = Catalog::new(fallback_items());
        let mut cart = Cart::new();
        cart.set_quantity(&catalog, "m-f-4", 1).unwrap();
        cart.set_quantity(&catalog, "m-c-3", 2).unwrap();

        assert_eq!(format_item_summary(&cart, &catalog), "2x Jeans, 1x Ties");
    }
}
