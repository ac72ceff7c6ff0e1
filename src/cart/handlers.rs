//! REST API handlers for shopping cart operations
//!
//! Carts live in the shared state keyed by cart id. Requests without a cart
//! id start a new cart and the response tells the client its id.

use super::{
    helpers::get_or_create_cart_id,
    models::{Cart, CartError, CartItemInput, CartResponse, ClearCartInput},
};
use crate::{error::ApiError, state::SharedState};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::debug;

/// Creates routes for cart-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/cart/increment", post(increment))
        .route("/cart/decrement", post(decrement))
        .route("/cart/clear", post(clear))
        .route("/cart/:cart_id", get(get_cart))
}

/// Endpoint: POST /cart/increment
async fn increment(
    State(state): State<SharedState>,
    Json(input): Json<CartItemInput>,
) -> Result<Json<CartResponse>, ApiError> {
    if !state.catalog.contains(&input.item_id) {
        return Err(CartError::UnknownItem(input.item_id).into());
    }
    let cart_id = get_or_create_cart_id(input.cart_id);
    let mut cart = state.carts.entry(cart_id.clone()).or_default();
    let quantity = cart.increment(&state.catalog, &input.item_id)?;

    debug!(%cart_id, item_id = %input.item_id, quantity, "incremented cart line");
    Ok(Json(CartResponse::new(cart_id, &cart)))
}

/// Endpoint: POST /cart/decrement
/// Decrementing an absent line is a no-op; an unknown cart is not created.
async fn decrement(
    State(state): State<SharedState>,
    Json(input): Json<CartItemInput>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart_id = get_or_create_cart_id(input.cart_id);
    let Some(mut cart) = state.carts.get_mut(&cart_id) else {
        Cart::new().decrement(&state.catalog, &input.item_id)?;
        return Ok(Json(CartResponse::new(cart_id, &Cart::new())));
    };
    let quantity = cart.decrement(&state.catalog, &input.item_id)?;

    debug!(%cart_id, item_id = %input.item_id, quantity, "decremented cart line");
    Ok(Json(CartResponse::new(cart_id, &cart)))
}

/// Endpoint: POST /cart/clear
async fn clear(
    State(state): State<SharedState>,
    Json(input): Json<ClearCartInput>,
) -> Json<CartResponse> {
    match state.carts.get_mut(&input.cart_id) {
        Some(mut cart) => {
            cart.clear();
            Json(CartResponse::new(input.cart_id, &cart))
        }
        None => Json(CartResponse::new(input.cart_id, &Cart::new())),
    }
}

/// Endpoint: GET /cart/:cart_id
async fn get_cart(
    State(state): State<SharedState>,
    Path(cart_id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state
        .carts
        .get(&cart_id)
        .ok_or_else(|| ApiError::not_found("cart_not_found", format!("cart not found: {}", cart_id)))?;
    Ok(Json(CartResponse::new(cart_id.clone(), &cart)))
}
