use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::landmarks::LandmarkResponse;
use crate::api::response::{ApiError, JSend};
use crate::storage::models::{Coordinate, Landmark};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub single_node: bool,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurgeResponse {
    pub sessions_deleted: u64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateLandmarkRequest {
    pub coordinate: Coordinate,
    pub name: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health(State(state): State<Arc<AppState>>) -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        single_node: state.config.is_single_node(),
        status: "healthy".to_string(),
    })
}

/// Delete all sessions. Gated behind TEST_MODE at router construction.
pub async fn admin_purge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<PurgeResponse>>, ApiError> {
    let sessions_deleted = state
        .db
        .purge_sessions()
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::warn!(sessions_deleted, "Purged all sessions");
    Ok(JSend::success(PurgeResponse { sessions_deleted }))
}

/// Seed a landmark. Gated behind TEST_MODE at router construction; landmark
/// data in production comes from an offline import.
pub async fn create_landmark(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLandmarkRequest>,
) -> Result<(StatusCode, Json<JSend<LandmarkResponse>>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }

    let landmark = Landmark {
        coordinate: req.coordinate,
        id: uuid::Uuid::new_v4().to_string(),
        name: req.name,
        owner_id: None,
        visit_count: 0,
    };

    state
        .db
        .put_landmark(&landmark)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        JSend::success(LandmarkResponse {
            coordinate: landmark.coordinate,
            id: landmark.id,
            name: landmark.name,
            owner_id: None,
            visit_count: 0,
        }),
    ))
}
