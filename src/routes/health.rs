// src/routes/health.rs
//! Liveness endpoint for the plant-buddy service.
//!
//! `GET /health` is used by container orchestrators and CI to check that the
//! service is up. It reports the size of the loaded catalog and whether a
//! telemetry store is attached, without touching the database itself.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LivenessResponse {
    status: &'static str,
    catalog_entries: usize,
    catalog_names: usize,
    database: bool,
    identifier: bool,
}

/// Handle `GET /health`.
async fn health(State(state): State<AppState>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok",
        catalog_entries: state.catalog.len(),
        catalog_names: state.catalog.name_count(),
        database: state.pool.is_some(),
        identifier: state.identifier.is_some(),
    })
}

/// Create a subrouter containing the `/health` route.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
