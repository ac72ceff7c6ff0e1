//! REST API handler for the catalog

use super::models::CatalogResponse;
use crate::state::SharedState;
use axum::{extract::State, routing::get, Json, Router};

pub fn routes() -> Router<SharedState> {
    Router::new().route("/catalog", get(get_catalog))
}

/// Endpoint: GET /catalog
/// Items grouped for the calculator, plus the fallback warning if any.
async fn get_catalog(State(state): State<SharedState>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        groups: state.catalog.grouped(),
        warning: state.catalog_warning.clone(),
    })
}
