//! Coupon Domain Models
//!
//! Coupon records as stored by the backend and the result of applying one to
//! an order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How `Coupon::value` is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponType {
    /// `value` is a percentage between 0 and 100
    Percentage,
    /// `value` is a currency amount
    Fixed,
}

/// A coupon row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: Uuid,

    /// Stored upper-case; matched case-insensitively
    pub code: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "type")]
    pub coupon_type: CouponType,

    pub value: Decimal,

    /// Subtotal-plus-delivery the order must reach
    #[serde(default)]
    pub min_order_amount: Decimal,

    /// `None` means unlimited
    #[serde(default)]
    pub usage_limit: Option<u32>,

    #[serde(default)]
    pub used_count: u32,

    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,

    pub is_active: bool,
}

impl Coupon {
    /// Creates an active, unlimited coupon with no minimum
    pub fn new(code: impl AsRef<str>, coupon_type: CouponType, value: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: normalize_code(code.as_ref()),
            description: String::new(),
            coupon_type,
            value,
            min_order_amount: Decimal::ZERO,
            usage_limit: None,
            used_count: 0,
            expires_at: None,
            is_active: true,
        }
    }

    pub fn with_minimum(mut self, amount: Decimal) -> Self {
        self.min_order_amount = amount;
        self
    }

    pub fn with_usage_limit(mut self, limit: u32) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    pub fn expiring_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }

    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .is_some_and(|limit| self.used_count >= limit)
    }
}

/// Canonical form of a code typed by a customer
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// A validated coupon and the discount it grants on a given subtotal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponApplication {
    pub coupon: Coupon,

    /// Subtotal-plus-delivery the discount was computed on
    pub order_subtotal: Decimal,

    /// Rounded to cents; never above `order_subtotal`
    pub discount_amount: Decimal,
}

/// Whether `record_usage` changed the counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageOutcome {
    Recorded,
    /// The order had already redeemed this coupon
    AlreadyRecorded,
    /// Every allowed redemption was used by other orders first
    LimitReached,
}

/// Input for `POST /checkout/:id/coupon`
#[derive(Debug, Deserialize)]
pub struct ApplyCouponInput {
    pub code: String,
}
