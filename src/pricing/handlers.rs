//! REST API handler for quotes

use super::{engine::price, models::QuoteInput, PricingResult};
use crate::{error::ApiError, state::SharedState};
use axum::{extract::State, routing::post, Json, Router};
use tracing::debug;

pub fn routes() -> Router<SharedState> {
    Router::new().route("/quote", post(quote))
}

/// Endpoint: POST /quote
/// Prices a cart. An unknown cart id quotes as an empty cart.
async fn quote(
    State(state): State<SharedState>,
    Json(input): Json<QuoteInput>,
) -> Result<Json<PricingResult>, ApiError> {
    let cart = state.cart_snapshot(&input.cart_id);
    let result = price(&cart, input.express, &state.catalog, &state.pricing)?;

    debug!(
        cart_id = %input.cart_id,
        express = input.express,
        final_total = %result.final_total,
        "quoted cart"
    );
    Ok(Json(result))
}
