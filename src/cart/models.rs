//! Shopping Cart Domain Models
//!
//! This module contains the cart itself (item id → quantity) and the
//! request/response shapes of the cart endpoints.

use crate::catalog::Catalog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// =============================================================================
// Cart Domain Models
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The id does not exist in the loaded catalog
    #[error("unknown item: {0}")]
    UnknownItem(String),
}

/// One selected item and how many pieces of it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub item_id: String,
    pub quantity: u32,
}

/// Mutable multiset of catalog selections.
///
/// Lines at quantity zero are removed, so absence and zero are the same
/// thing. Lines are kept in id order, which makes pricing deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: BTreeMap<String, u32>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one piece of `item_id`, creating the line if needed.
    /// Returns the new quantity.
    pub fn increment(&mut self, catalog: &Catalog, item_id: &str) -> Result<u32, CartError> {
        Self::ensure_known(catalog, item_id)?;
        let quantity = self.lines.entry(item_id.to_string()).or_insert(0);
        *quantity = quantity.saturating_add(1);
        Ok(*quantity)
    }

    /// Removes one piece of `item_id`; a missing line stays missing.
    /// Returns the new quantity.
    pub fn decrement(&mut self, catalog: &Catalog, item_id: &str) -> Result<u32, CartError> {
        Self::ensure_known(catalog, item_id)?;
        let Some(quantity) = self.lines.get_mut(item_id) else {
            return Ok(0);
        };
        *quantity = quantity.saturating_sub(1);
        let remaining = *quantity;
        if remaining == 0 {
            self.lines.remove(item_id);
        }
        Ok(remaining)
    }

    /// Sets a line directly; zero removes it.
    pub fn set_quantity(
        &mut self,
        catalog: &Catalog,
        item_id: &str,
        quantity: u32,
    ) -> Result<(), CartError> {
        Self::ensure_known(catalog, item_id)?;
        if quantity == 0 {
            self.lines.remove(item_id);
        } else {
            self.lines.insert(item_id.to_string(), quantity);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn quantity_of(&self, item_id: &str) -> u32 {
        self.lines.get(item_id).copied().unwrap_or(0)
    }

    /// Number of distinct items with a positive quantity
    pub fn total_lines(&self) -> usize {
        self.lines.len()
    }

    /// Number of pieces across all lines
    pub fn total_items(&self) -> u64 {
        self.lines.values().map(|&q| u64::from(q)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterates `(item_id, quantity)` in id order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.lines.iter().map(|(id, &q)| (id.as_str(), q))
    }

    pub fn lines(&self) -> Vec<CartLine> {
        self.iter()
            .map(|(item_id, quantity)| CartLine {
                item_id: item_id.to_string(),
                quantity,
            })
            .collect()
    }

    fn ensure_known(catalog: &Catalog, item_id: &str) -> Result<(), CartError> {
        if catalog.contains(item_id) {
            Ok(())
        } else {
            Err(CartError::UnknownItem(item_id.to_string()))
        }
    }
}

// =============================================================================
// Cart API Models
// =============================================================================

/// Input for the increment/decrement endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    /// Catalog id of the item to change
    pub item_id: String,

    /// Optional cart identifier; a new cart is created when absent
    pub cart_id: Option<String>,
}

/// Input for the clear endpoint
#[derive(Debug, Deserialize)]
pub struct ClearCartInput {
    #[serde(rename = "cartId")]
    pub cart_id: String,
}

/// Current cart contents
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub cart_id: String,
    pub lines: Vec<CartLine>,
    pub total_items: u64,
    pub total_lines: usize,
}

impl CartResponse {
    pub fn new(cart_id: String, cart: &Cart) -> Self {
        Self {
            cart_id,
            lines: cart.lines(),
            total_items: cart.total_items(),
            total_lines: cart.total_lines(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fallback::fallback_items;

    fn catalog() -> Catalog {
        Catalog::new(fallback_items())
    }

    #[test]
    fn increment_creates_and_grows_lines() {
        let catalog = catalog();
        let mut cart = Cart::new();

        assert_eq!(cart.increment(&catalog, "m-f-1").unwrap(), 1);
        assert_eq!(cart.increment(&catalog, "m-f-1").unwrap(), 2);
        assert_eq!(cart.increment(&catalog, "m-f-4").unwrap(), 1);

        assert_eq!(cart.total_lines(), 2);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.quantity_of("m-f-1"), 2);
        assert_eq!(cart.quantity_of("m-f-2"), 0);
    }

    #[test]
    fn decrement_clamps_at_zero_and_drops_line() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.increment(&catalog, "w-d-1").unwrap();

        assert_eq!(cart.decrement(&catalog, "w-d-1").unwrap(), 0);
        assert!(cart.is_empty());

        // Already at zero: no-op
        assert_eq!(cart.decrement(&catalog, "w-d-1").unwrap(), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn unknown_items_are_rejected() {
        let catalog = catalog();
        let mut cart = Cart::new();
        assert_eq!(
            cart.increment(&catalog, "nope"),
            Err(CartError::UnknownItem("nope".into()))
        );
        assert!(cart.decrement(&catalog, "nope").is_err());
    }

    #[test]
    fn zero_quantity_line_equals_absence() {
        let catalog = catalog();
        let mut with_zero = Cart::new();
        with_zero.set_quantity(&catalog, "m-c-1", 3).unwrap();
        with_zero.set_quantity(&catalog, "m-c-1", 0).unwrap();

        assert_eq!(with_zero, Cart::new());
    }

    #[test]
    fn clear_removes_everything() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.set_quantity(&catalog, "h-b-1", 4).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
    }
}
