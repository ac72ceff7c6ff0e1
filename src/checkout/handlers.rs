//! REST API handlers for checkout
//!
//! Each handler locks the session for the whole operation, so two
//! submissions of the same order are processed one after the other.

use super::{
    models::{
        ConfirmInput, ConfirmedOrder, CustomerDetails, ExpressInput, OpenCheckoutInput,
        PaymentStarted, TipInput,
    },
    session::{CheckoutSession, CheckoutView},
    CheckoutError, OrderStatus,
};
use crate::{coupon::models::ApplyCouponInput, error::ApiError, state::SharedState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Creates routes for checkout operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/checkout", post(open_checkout))
        .route("/checkout/:id", get(get_checkout))
        .route("/checkout/:id/cart", post(refresh_cart))
        .route("/checkout/:id/tip", post(set_tip))
        .route("/checkout/:id/express", post(set_express))
        .route("/checkout/:id/coupon", post(apply_coupon).delete(remove_coupon))
        .route("/checkout/:id/customer", post(set_customer))
        .route("/checkout/:id/payment", post(initiate_payment))
        .route("/checkout/:id/reopen", post(reopen))
        .route("/checkout/:id/cancel", post(cancel))
        .route("/checkout/:id/confirm", post(confirm))
}

type ViewResult = Result<Json<CheckoutView>, ApiError>;

/// Endpoint: POST /checkout
/// Opens a priced checkout for the current contents of a cart.
async fn open_checkout(
    State(state): State<SharedState>,
    Json(input): Json<OpenCheckoutInput>,
) -> Result<(StatusCode, Json<CheckoutView>), ApiError> {
    let cart = state
        .carts
        .get(&input.cart_id)
        .map(|cart| cart.clone())
        .ok_or_else(|| CheckoutError::CartNotFound(input.cart_id.clone()))?;

    let session = CheckoutSession::open(
        input.cart_id.clone(),
        cart,
        input.express,
        state.pricing_context(),
        Utc::now(),
    )?;
    let view = session.view();
    state
        .sessions
        .insert(session.id(), Arc::new(Mutex::new(session)));

    info!(
        session_id = %view.id,
        cart_id = %view.cart_id,
        amount_minor_units = view.amount.amount_minor_units,
        "checkout opened"
    );
    Ok((StatusCode::CREATED, Json(view)))
}

/// Endpoint: GET /checkout/:id
async fn get_checkout(State(state): State<SharedState>, Path(id): Path<Uuid>) -> ViewResult {
    let handle = state.session(id)?;
    let session = handle.lock().await;
    Ok(Json(session.view()))
}

/// Endpoint: POST /checkout/:id/cart
/// Re-reads the cart the checkout was opened from.
async fn refresh_cart(State(state): State<SharedState>, Path(id): Path<Uuid>) -> ViewResult {
    let handle = state.session(id)?;
    let mut session = handle.lock().await;
    let cart = state.cart_snapshot(session.cart_id());
    session.update_cart(cart, state.pricing_context(), Utc::now())?;
    Ok(Json(session.view()))
}

/// Endpoint: POST /checkout/:id/tip
async fn set_tip(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<TipInput>,
) -> ViewResult {
    let tip = input.percentage()?;
    let handle = state.session(id)?;
    let mut session = handle.lock().await;
    session.set_tip(tip, state.pricing_context(), Utc::now())?;
    Ok(Json(session.view()))
}

/// Endpoint: POST /checkout/:id/express
async fn set_express(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ExpressInput>,
) -> ViewResult {
    let handle = state.session(id)?;
    let mut session = handle.lock().await;
    session.set_express(input.express, state.pricing_context(), Utc::now())?;
    Ok(Json(session.view()))
}

/// Endpoint: POST /checkout/:id/coupon
async fn apply_coupon(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ApplyCouponInput>,
) -> ViewResult {
    let handle = state.session(id)?;
    let mut session = handle.lock().await;
    state
        .checkout
        .apply_coupon(&mut session, &input.code, state.pricing_context(), Utc::now())
        .await?;
    Ok(Json(session.view()))
}

/// Endpoint: DELETE /checkout/:id/coupon
async fn remove_coupon(State(state): State<SharedState>, Path(id): Path<Uuid>) -> ViewResult {
    let handle = state.session(id)?;
    let mut session = handle.lock().await;
    session.remove_coupon(state.pricing_context(), Utc::now())?;
    Ok(Json(session.view()))
}

/// Endpoint: POST /checkout/:id/customer
async fn set_customer(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(details): Json<CustomerDetails>,
) -> ViewResult {
    let handle = state.session(id)?;
    let mut session = handle.lock().await;
    session.set_customer(details)?;
    Ok(Json(session.view()))
}

/// Endpoint: POST /checkout/:id/payment
/// Freezes the amount and opens a payment for it.
async fn initiate_payment(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentStarted>, ApiError> {
    let handle = state.session(id)?;
    let mut session = handle.lock().await;
    let payment = state
        .checkout
        .initiate_payment(&mut session, state.pricing_context(), Utc::now())
        .await?;
    Ok(Json(PaymentStarted {
        payment,
        checkout: session.view(),
    }))
}

/// Endpoint: POST /checkout/:id/reopen
async fn reopen(State(state): State<SharedState>, Path(id): Path<Uuid>) -> ViewResult {
    let handle = state.session(id)?;
    let mut session = handle.lock().await;
    state.checkout.reopen(&mut session).await?;
    Ok(Json(session.view()))
}

/// Endpoint: POST /checkout/:id/cancel
async fn cancel(State(state): State<SharedState>, Path(id): Path<Uuid>) -> ViewResult {
    let handle = state.session(id)?;
    let mut session = handle.lock().await;
    state.checkout.cancel(&mut session).await?;
    Ok(Json(session.view()))
}

/// Endpoint: POST /checkout/:id/confirm
/// Captures the payment and records the order; the cart is emptied on success.
async fn confirm(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ConfirmInput>,
) -> Result<Json<ConfirmedOrder>, ApiError> {
    let handle = state.session(id)?;
    let mut session = handle.lock().await;
    let already_paid = session.status() == OrderStatus::Paid;
    let confirmed = state
        .checkout
        .confirm_payment(&mut session, &input.payment_reference)
        .await?;

    // A retried confirm must not touch a cart started after the payment
    if !already_paid {
        if let Some((cart_id, _)) = state.carts.remove(session.cart_id()) {
            info!(%cart_id, order_number = %confirmed.order_number, "cart cleared after payment");
        }
    }
    Ok(Json(confirmed))
}
