//! Checkout Domain Models
//!
//! Order lifecycle, the final payable amount, customer/schedule details and
//! the record handed to order storage.

use super::{payment::PaymentIntent, session::CheckoutView};
use crate::{
    cart::models::CartError,
    collaborator::Unavailable,
    coupon::CouponError,
    pricing::{models::PricedLine, tip::InvalidTip, PricingError, TipPercentage},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// Order Lifecycle
// =============================================================================

/// Order states.
///
/// `draft → priced → payment_initiated → paid → fulfilling → completed`, with
/// `payment_failed` and `cancelled` as terminal exits from
/// `payment_initiated`. Re-pricing keeps an order in `priced`; leaving
/// `payment_initiated` back to `priced` is only possible by reopening, which
/// discards the outstanding payment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Priced,
    PaymentInitiated,
    Paid,
    Fulfilling,
    Completed,
    PaymentFailed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Priced => "priced",
            Self::PaymentInitiated => "payment_initiated",
            Self::Paid => "paid",
            Self::Fulfilling => "fulfilling",
            Self::Completed => "completed",
            Self::PaymentFailed => "payment_failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Draft, Priced)
                | (Priced, Priced)
                | (Priced, PaymentInitiated)
                | (PaymentInitiated, Priced)
                | (PaymentInitiated, Paid)
                | (PaymentInitiated, PaymentFailed)
                | (PaymentInitiated, Cancelled)
                | (Paid, Fulfilling)
                | (Fulfilling, Completed)
        )
    }

    pub fn transition(self, next: OrderStatus) -> Result<OrderStatus, CheckoutError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CheckoutError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Cart, express flag, tip and coupon may only change in these states
    pub fn accepts_changes(self) -> bool {
        matches!(self, Self::Draft | Self::Priced)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::PaymentFailed | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Tip(#[from] InvalidTip),

    #[error(transparent)]
    Unavailable(#[from] Unavailable),

    #[error("checkout session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("cart not found: {0}")]
    CartNotFound(String),

    #[error("cart is empty")]
    EmptyCart,

    #[error("order total is zero; nothing to charge")]
    NothingToCharge,

    #[error("customer details are required before payment")]
    MissingCustomer,

    #[error("invalid customer details: {0}")]
    InvalidCustomer(String),

    /// A payment request is outstanding; reopen the order to change it
    #[error("order amount is locked while a payment request is outstanding")]
    AmountFrozen,

    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("payment reference does not match the outstanding payment request")]
    PaymentMismatch,

    #[error("Failed to initialize payment: {0}")]
    PaymentInitiationFailed(String),

    #[error("Payment failed: {0}")]
    PaymentCaptureFailed(String),

    #[error("Failed to save order: {0}")]
    OrderPersistenceFailed(String),

    /// The processor captured a different amount than the order was frozen at
    #[error(
        "Payment {payment_reference} captured {captured} minor units, expected {expected}; \
         please contact support"
    )]
    CapturedAmountMismatch {
        payment_reference: String,
        captured: i64,
        expected: i64,
    },

    /// Money was captured but the order record could not be written
    #[error(
        "Payment {payment_reference} succeeded but the order could not be recorded; \
         please contact support"
    )]
    PaidButUnrecorded { payment_reference: String },
}

// =============================================================================
// Final Amount
// =============================================================================

/// The amount charged and recorded for an order.
///
/// Produced only by [`super::aggregator::finalize`]; payment requests, order
/// records and confirmations all read it instead of recomputing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalCheckoutAmount {
    pub base_total: Decimal,
    pub delivery_fee: Decimal,
    pub tip_amount: Decimal,
    pub discount_amount: Decimal,
    pub final_total: Decimal,
    /// `final_total` in cents
    pub amount_minor_units: i64,
    pub currency: String,
}

// =============================================================================
// Customer & Schedule
// =============================================================================

/// Pickup or delivery window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TimeSlot {
    #[default]
    Morning,
    Afternoon,
    Evening,
}

impl TimeSlot {
    /// Reads free text such as "Afternoon (12pm - 4pm)"; unknown text is morning
    pub fn normalize(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("afternoon") {
            Self::Afternoon
        } else if text.contains("evening") {
            Self::Evening
        } else {
            Self::Morning
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }
}

impl From<String> for TimeSlot {
    fn from(text: String) -> Self {
        Self::normalize(&text)
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.as_str().to_string()
    }
}

/// Delivery zones served by the business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceArea {
    SouthSurrey,
    Langley,
    WhiteRock,
}

impl ServiceArea {
    /// Maps a city to its zone; Surrey, Delta and unknown cities go to South Surrey
    pub fn from_city(city: &str) -> Self {
        let city = city.to_lowercase();
        if city.contains("langley") {
            Self::Langley
        } else if city.contains("white rock") {
            Self::WhiteRock
        } else {
            Self::SouthSurrey
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    #[serde(default)]
    pub unit_number: Option<String>,
    pub pickup_date: NaiveDate,
    #[serde(default)]
    pub pickup_time: TimeSlot,
    pub delivery_date: NaiveDate,
    #[serde(default)]
    pub delivery_time: TimeSlot,
    #[serde(default)]
    pub special_instructions: Option<String>,
}

impl CustomerDetails {
    pub fn service_area(&self) -> ServiceArea {
        ServiceArea::from_city(&self.city)
    }

    pub fn validate(&self) -> Result<(), CheckoutError> {
        let required = [
            ("full name", &self.full_name),
            ("phone", &self.phone),
            ("address", &self.address_line1),
            ("city", &self.city),
            ("postal code", &self.postal_code),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(CheckoutError::InvalidCustomer(format!("{} is required", field)));
        }
        if !self.email.contains('@') {
            return Err(CheckoutError::InvalidCustomer("email is invalid".into()));
        }
        if self.delivery_date < self.pickup_date {
            return Err(CheckoutError::InvalidCustomer(
                "delivery date is before pickup date".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Order Record
// =============================================================================

/// Shape written to order storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: Uuid,
    pub order_number: Option<String>,
    pub status: OrderStatus,
    pub is_express_service: bool,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub tip_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub amount_minor_units: i64,
    pub currency: String,
    pub coupon_code: Option<String>,
    pub items: Vec<PricedLine>,
    pub customer: Option<CustomerDetails>,
    pub service_area: Option<ServiceArea>,
    pub payment_reference: Option<String>,
}

// =============================================================================
// Checkout API Models
// =============================================================================

/// Input for `POST /checkout`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenCheckoutInput {
    pub cart_id: String,
    #[serde(default)]
    pub express: bool,
}

/// Input for `POST /checkout/:id/tip`
#[derive(Debug, Deserialize)]
pub struct TipInput {
    /// Whole percent; only values on the tip menu are accepted
    pub tip: u32,
}

impl TipInput {
    pub fn percentage(&self) -> Result<TipPercentage, CheckoutError> {
        Ok(TipPercentage::try_from(self.tip)?)
    }
}

/// Input for `POST /checkout/:id/express`
#[derive(Debug, Deserialize)]
pub struct ExpressInput {
    pub express: bool,
}

/// Input for `POST /checkout/:id/confirm`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmInput {
    pub payment_reference: String,
}

/// Response for `POST /checkout/:id/payment`
#[derive(Debug, Clone, Serialize)]
pub struct PaymentStarted {
    pub payment: PaymentIntent,
    pub checkout: CheckoutView,
}

/// Result of a confirmed checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedOrder {
    pub order_id: Uuid,
    pub order_number: String,
    pub payment_reference: String,
    pub amount: FinalCheckoutAmount,
}
