//! Pricing Domain Models and Constants
//!
//! This module contains the canonical pricing configuration and the derived
//! quote returned by the engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Pricing Constants
// =============================================================================

/// Orders whose base total reaches this amount get free pickup & delivery
pub const FREE_DELIVERY_THRESHOLD: Decimal = Decimal::from_parts(3500, 0, 0, false, 2);
/// Flat pickup & delivery fee charged below the threshold
pub const FLAT_DELIVERY_FEE: Decimal = Decimal::from_parts(500, 0, 0, false, 2);
/// Added to the unit price of every piece when 24-hour express is selected
pub const EXPRESS_SURCHARGE_PER_ITEM: Decimal = Decimal::from_parts(100, 0, 0, false, 2);
/// Currency charged by the payment processor
pub const CURRENCY: &str = "CAD";

// =============================================================================
// Pricing Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// A cart line does not resolve against the catalog it is priced with
    #[error("item not found in catalog: {0}")]
    ItemNotFound(String),

    #[error("amount {0} cannot be expressed in minor currency units")]
    AmountOutOfRange(Decimal),

    #[error("invalid pricing configuration: {0}")]
    InvalidConfig(String),
}

/// Business rules shared by every call site that prices an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    pub free_delivery_threshold: Decimal,
    pub flat_delivery_fee: Decimal,
    pub express_surcharge: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_delivery_threshold: FREE_DELIVERY_THRESHOLD,
            flat_delivery_fee: FLAT_DELIVERY_FEE,
            express_surcharge: EXPRESS_SURCHARGE_PER_ITEM,
        }
    }
}

impl PricingConfig {
    /// Builds a configuration, rejecting negative amounts
    pub fn new(
        free_delivery_threshold: Decimal,
        flat_delivery_fee: Decimal,
        express_surcharge: Decimal,
    ) -> Result<Self, PricingError> {
        for (name, value) in [
            ("free delivery threshold", free_delivery_threshold),
            ("flat delivery fee", flat_delivery_fee),
            ("express surcharge", express_surcharge),
        ] {
            if value.is_sign_negative() {
                return Err(PricingError::InvalidConfig(format!(
                    "{} must not be negative (got {})",
                    name, value
                )));
            }
        }
        Ok(Self {
            free_delivery_threshold,
            flat_delivery_fee,
            express_surcharge,
        })
    }
}

// =============================================================================
// Pricing Results
// =============================================================================

/// One priced cart line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub item_id: String,
    pub name: String,
    pub quantity: u32,
    /// Base price plus the express surcharge when selected
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Quote for a cart, before tip and coupon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub lines: Vec<PricedLine>,
    pub express: bool,
    pub total_items: u64,
    pub base_total: Decimal,
    pub delivery_fee: Decimal,
    pub final_total: Decimal,

    /// Portion of `base_total` that comes from the express surcharge
    pub express_surcharge_total: Decimal,
    pub qualifies_for_free_delivery: bool,
    /// How much more would waive the delivery fee; zero when already free
    pub amount_to_free_delivery: Decimal,
}

impl PricingResult {
    /// Base total plus delivery, the amount coupons and tips are measured on
    pub fn subtotal_with_delivery(&self) -> Decimal {
        self.base_total + self.delivery_fee
    }

    pub fn is_empty(&self) -> bool {
        self.total_items == 0
    }
}

// =============================================================================
// Pricing API Models
// =============================================================================

/// Input for `POST /quote`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteInput {
    pub cart_id: String,

    /// 24-hour express service
    #[serde(default)]
    pub express: bool,
}
