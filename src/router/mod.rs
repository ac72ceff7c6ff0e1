//! Routing module for the checkout service

use crate::state::SharedState;
use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Creates and configures the application router with all routes and middleware
pub fn create_app_router(state: SharedState) -> Router {
    // Middleware: Log requests
    let log_layer = axum::middleware::from_fn(|req: Request<Body>, next: Next| async move {
        let method = req.method().clone();
        let uri = req.uri().clone();
        let started = Instant::now();

        let res = next.run(req).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        if res.status().is_success() {
            info!(%method, %uri, status = res.status().as_u16(), elapsed_ms, "request");
        } else {
            warn!(%method, %uri, status = res.status().as_u16(), elapsed_ms, "request failed");
        }
        res
    });

    // Middleware: CORS (the website calls from its own origin)
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .merge(crate::catalog::routes())
        .merge(crate::cart::routes())
        .merge(crate::pricing::routes())
        .merge(crate::checkout::routes())
        .merge(crate::chat::routes())
        .layer(log_layer)
        .layer(cors_layer)
        .with_state(state)
}

/// Endpoint: GET /health
async fn health(State(state): State<SharedState>) -> Json<Value> {
    let degraded = state.catalog_warning.is_some() || !state.checkout.payments_configured();
    Json(json!({
        "status": if degraded { "degraded" } else { "healthy" },
        "catalog": if state.catalog_warning.is_some() { "fallback" } else { "live" },
        "catalogItems": state.catalog.len(),
        "payments": state.checkout.payments_configured(),
        "coupons": state.checkout.coupons_configured(),
    }))
}
