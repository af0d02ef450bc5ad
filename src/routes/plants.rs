// src/routes/plants.rs
//! Tracked plant endpoints: registration, sensor readings and health.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::health::{HealthAssessment, HealthHistory};
use crate::models::SensorSnapshot;
use crate::plants::{PlantError, PlantId, TrackedPlant};
use crate::store;
use crate::AppState;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/plants", post(add_plant).get(list_plants))
        .route("/plants/{id}", get(get_plant).delete(delete_plant))
        .route("/plants/{id}/readings", post(post_reading))
        .route("/plants/{id}/health", get(plant_health))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewPlant {
    nickname: String,
    #[serde(default, alias = "catalog_name")]
    catalog_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    plant_id: PlantId,
    assessment: HealthAssessment,
    history: HealthHistory,
}

/// One row of the plant listing: the plant and its current score.
#[derive(Serialize)]
struct PlantSummary {
    plant: TrackedPlant,
    assessment: HealthAssessment,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn unknown_plant(id: PlantId) -> Response {
    error_response(StatusCode::NOT_FOUND, format!("Unknown plant {id}"))
}

async fn add_plant(State(state): State<AppState>, Json(req): Json<NewPlant>) -> Response {
    // ---
    info!("POST /plants - '{}'", req.nickname);

    let mut plants = state.plants();
    match plants.add(&req.nickname, req.catalog_name.as_deref(), &state.catalog) {
        Ok(plant) => (StatusCode::CREATED, Json(plant.clone())).into_response(),
        Err(e) => {
            let status = match &e {
                PlantError::BlankNickname => StatusCode::BAD_REQUEST,
                PlantError::DuplicateNickname(_) => StatusCode::CONFLICT,
                PlantError::UnknownCatalogName(_) => StatusCode::UNPROCESSABLE_ENTITY,
            };
            warn!("Rejected plant '{}': {}", req.nickname, e);
            error_response(status, e.to_string())
        }
    }
}

async fn list_plants(State(state): State<AppState>) -> Response {
    // ---
    debug!("GET /plants");

    let now = Utc::now();
    let plants = state.plants();
    let summaries: Vec<PlantSummary> = plants
        .list()
        .into_iter()
        .filter_map(|plant| {
            let assessment = plants.current_assessment(&plant.id, &state.scorer, &state.catalog, now)?;
            Some(PlantSummary {
                plant: plant.clone(),
                assessment,
            })
        })
        .collect();

    debug!("Listing {} plants", summaries.len());
    Json(summaries).into_response()
}

async fn delete_plant(State(state): State<AppState>, Path(id): Path<PlantId>) -> Response {
    // ---
    info!("DELETE /plants/{}", id);

    match state.plants().remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => unknown_plant(id),
    }
}

async fn get_plant(State(state): State<AppState>, Path(id): Path<PlantId>) -> Response {
    // ---
    debug!("GET /plants/{}", id);

    match state.plants().get(&id) {
        Some(plant) => Json(plant.clone()).into_response(),
        None => unknown_plant(id),
    }
}

async fn post_reading(
    State(state): State<AppState>,
    Path(id): Path<PlantId>,
    Json(body): Json<Value>,
) -> Response {
    // ---
    info!("POST /plants/{}/readings", id);

    // Only a reading sent without a timestamp is stamped on receipt. One
    // whose timestamp cannot be read keeps none and scores neutral freshness.
    let stamp_on_receipt = matches!(body.get("timestamp"), None | Some(Value::Null));
    let mut snapshot: SensorSnapshot = match serde_json::from_value(body) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, format!("Invalid reading: {e}"))
        }
    };

    let now = Utc::now();
    if stamp_on_receipt {
        snapshot.timestamp = Some(now.into());
    }

    let plant = {
        let mut plants = state.plants();
        match plants.update_reading(&id, snapshot.clone()) {
            Some(plant) => plant.clone(),
            None => return unknown_plant(id),
        }
    };

    if let Some(pool) = &state.pool {
        let recorded_at = snapshot
            .timestamp
            .and_then(|ts| ts.to_utc(state.scorer.local_zone()))
            .unwrap_or(now);
        if let Err(e) = store::store_reading(pool, id, &snapshot, recorded_at).await {
            error!("Failed to store reading for {}: {}", id, e);
        }
    }

    Json(plant).into_response()
}

async fn plant_health(State(state): State<AppState>, Path(id): Path<PlantId>) -> Response {
    // ---
    debug!("GET /plants/{}/health", id);

    if state.plants().get(&id).is_none() {
        return unknown_plant(id);
    }

    // Step 1: newest persisted reading, when a store is attached
    let stored = match &state.pool {
        Some(pool) => match store::latest_reading(pool, id).await {
            Ok(reading) => reading.map(|r| r.to_snapshot()),
            Err(e) => {
                warn!("Falling back to in-memory reading for {}: {}", id, e);
                None
            }
        },
        None => None,
    };

    // Step 2: score and record
    let now = Utc::now();
    let response = {
        let mut plants = state.plants();
        plants
            .assess(&id, stored.as_ref(), &state.scorer, &state.catalog, now)
            .map(|(assessment, history)| HealthResponse {
                plant_id: id,
                assessment,
                history: history.clone(),
            })
    };

    match response {
        Some(body) => {
            info!(
                "Plant {} scored {} ({})",
                id, body.assessment.overall_score, body.assessment.status
            );
            Json(body).into_response()
        }
        None => unknown_plant(id),
    }
}
