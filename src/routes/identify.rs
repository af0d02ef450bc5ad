// src/routes/identify.rs
//! Identification endpoints.
//!
//! - `POST /identify/resolve` takes an identification result as JSON and
//!   resolves it against the catalog.
//! - `POST /identify` takes raw image bytes, asks the identification service
//!   what plant it shows, then resolves that answer the same way.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::IdentificationResult;
use crate::resolver::ResolutionOutcome;
use crate::AppState;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/identify", post(identify_image))
        .route("/identify/resolve", post(resolve))
}

#[derive(Serialize)]
struct IdentifyResponse<'a> {
    identification: &'a IdentificationResult,
    resolution: ResolutionOutcome<'a>,
}

#[derive(Debug, Deserialize)]
struct ImageParams {
    filename: Option<String>,
}

async fn resolve(State(state): State<AppState>, Json(id): Json<IdentificationResult>) -> Response {
    // ---
    info!("POST /identify/resolve");

    let resolution = state.resolver.resolve(&id, &state.catalog);
    debug!("Resolution for {:?}: {:?}", id.query_terms(), resolution);

    Json(resolution).into_response()
}

async fn identify_image(
    State(state): State<AppState>,
    Query(params): Query<ImageParams>,
    body: Bytes,
) -> Response {
    // ---
    info!("POST /identify - {} bytes", body.len());

    if body.is_empty() {
        return (StatusCode::BAD_REQUEST, Json("Request body must contain an image")).into_response();
    }

    let identification = match &state.identifier {
        Some(client) => {
            let filename = params.filename.as_deref().unwrap_or("upload.jpg");
            client.identify(body.to_vec(), filename).await
        }
        None => {
            warn!("POST /identify called but no identification service is configured");
            IdentificationResult::failed("Identification service not configured")
        }
    };

    let resolution = state.resolver.resolve(&identification, &state.catalog);
    Json(IdentifyResponse {
        identification: &identification,
        resolution,
    })
    .into_response()
}
