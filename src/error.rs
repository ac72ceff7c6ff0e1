//! HTTP error responses
//!
//! Every failing endpoint answers `{ "error": message, "kind": tag }` with a
//! status chosen from the domain error.

use crate::{
    cart::models::CartError,
    chat::OutboxError,
    checkout::CheckoutError,
    coupon::CouponError,
    pricing::PricingError,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(kind: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, kind, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(kind = self.kind, status = %self.status, message = %self.message, "request failed");
        } else {
            warn!(kind = self.kind, status = %self.status, message = %self.message, "request rejected");
        }
        let body = Json(json!({ "error": self.message, "kind": self.kind }));
        (self.status, body).into_response()
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::UnknownItem(_) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "unknown_item", err.to_string())
            }
        }
    }
}

impl From<PricingError> for ApiError {
    fn from(err: PricingError) -> Self {
        let kind = match err {
            PricingError::ItemNotFound(_) => "item_not_found",
            PricingError::AmountOutOfRange(_) => "amount_out_of_range",
            PricingError::InvalidConfig(_) => "invalid_config",
        };
        let status = match err {
            PricingError::ItemNotFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, kind, err.to_string())
    }
}

impl From<CouponError> for ApiError {
    fn from(err: CouponError) -> Self {
        let (status, kind) = match err {
            CouponError::InvalidCode => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_coupon_code"),
            CouponError::Expired => (StatusCode::UNPROCESSABLE_ENTITY, "coupon_expired"),
            CouponError::UsageLimitReached => {
                (StatusCode::UNPROCESSABLE_ENTITY, "coupon_usage_limit_reached")
            }
            CouponError::MinimumNotMet { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "coupon_minimum_not_met")
            }
            CouponError::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "coupon_unavailable"),
        };
        Self::new(status, kind, err.to_string())
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        use CheckoutError as E;
        let (status, kind) = match &err {
            E::Pricing(inner) => return inner.clone().into(),
            E::Coupon(inner) => return inner.clone().into(),
            E::Cart(inner) => return inner.clone().into(),
            E::Tip(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_tip"),
            E::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            E::SessionNotFound(_) => (StatusCode::NOT_FOUND, "checkout_not_found"),
            E::CartNotFound(_) => (StatusCode::NOT_FOUND, "cart_not_found"),
            E::EmptyCart => (StatusCode::UNPROCESSABLE_ENTITY, "empty_cart"),
            E::NothingToCharge => (StatusCode::UNPROCESSABLE_ENTITY, "nothing_to_charge"),
            E::MissingCustomer => (StatusCode::UNPROCESSABLE_ENTITY, "missing_customer"),
            E::InvalidCustomer(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_customer"),
            E::AmountFrozen => (StatusCode::CONFLICT, "amount_frozen"),
            E::InvalidTransition { .. } => (StatusCode::CONFLICT, "invalid_transition"),
            E::PaymentMismatch => (StatusCode::CONFLICT, "payment_mismatch"),
            E::PaymentInitiationFailed(_) => (StatusCode::BAD_GATEWAY, "payment_initiation_failed"),
            E::PaymentCaptureFailed(_) => (StatusCode::PAYMENT_REQUIRED, "payment_capture_failed"),
            E::OrderPersistenceFailed(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "order_persistence_failed")
            }
            E::CapturedAmountMismatch { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "captured_amount_mismatch")
            }
            E::PaidButUnrecorded { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "paid_but_unrecorded")
            }
        };
        Self::new(status, kind, err.to_string())
    }
}

impl From<OutboxError> for ApiError {
    fn from(err: OutboxError) -> Self {
        let (status, kind) = match err {
            OutboxError::EmptyMessage => (StatusCode::UNPROCESSABLE_ENTITY, "empty_message"),
            OutboxError::UnknownMessage(_) => (StatusCode::NOT_FOUND, "unknown_message"),
            OutboxError::AlreadyConfirmed(_) => (StatusCode::CONFLICT, "already_confirmed"),
            OutboxError::NotFailed(_) => (StatusCode::CONFLICT, "not_failed"),
        };
        Self::new(status, kind, err.to_string())
    }
}
