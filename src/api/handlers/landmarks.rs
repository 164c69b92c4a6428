use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::middleware::CurrentMember;
use crate::api::response::{ApiError, JSend};
use crate::storage::models::{Coordinate, Landmark};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct LandmarkResponse {
    pub coordinate: Coordinate,
    pub id: String,
    pub name: String,
    pub owner_id: Option<String>,
    pub visit_count: u64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn get_landmark(
    State(state): State<Arc<AppState>>,
    Path(landmark_id): Path<String>,
) -> Result<Json<JSend<LandmarkResponse>>, ApiError> {
    let landmark = state
        .db
        .get_landmark(&landmark_id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Landmark not found"))?;

    Ok(JSend::success(landmark_to_response(&landmark)))
}

pub async fn visit_landmark(
    State(state): State<Arc<AppState>>,
    Path(landmark_id): Path<String>,
) -> Result<Json<JSend<LandmarkResponse>>, ApiError> {
    let landmark = state
        .db
        .visit_landmark(&landmark_id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Landmark not found"))?;

    tracing::debug!(landmark_id = %landmark_id, "Recorded landmark visit");
    Ok(JSend::success(landmark_to_response(&landmark)))
}

/// Claim a landmark as its representative member.
///
/// The ousted previous owner, if any, gets a push notification on their
/// registered device. Delivery is best-effort and never blocks the response.
pub async fn occupy_landmark(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentMember>,
    Path(landmark_id): Path<String>,
) -> Result<Json<JSend<LandmarkResponse>>, ApiError> {
    let outcome = state
        .db
        .claim_landmark(&landmark_id, &current.id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Landmark not found"))?;

    tracing::debug!(
        landmark_id = %landmark_id,
        member_id = %current.id,
        "Landmark claimed"
    );

    if let Some(previous_id) = &outcome.previous_owner_id {
        if previous_id != &current.id {
            notify_previous_owner(&state, previous_id, &outcome.landmark);
        }
    }

    Ok(JSend::success(landmark_to_response(&outcome.landmark)))
}

// ============================================================================
// Helpers
// ============================================================================

fn notify_previous_owner(state: &Arc<AppState>, previous_id: &str, landmark: &Landmark) {
    let device_token = match state.db.get_member(previous_id) {
        Ok(Some(member)) => member.notice_token,
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load previous landmark owner");
            None
        }
    };

    let Some(device_token) = device_token else {
        return;
    };

    let push = Arc::clone(&state.push);
    let name = landmark.name.clone();
    tokio::spawn(async move {
        push.send(
            &device_token,
            "Landmark taken",
            &format!("Someone claimed {name} from you"),
        )
        .await;
    });
}

fn landmark_to_response(landmark: &Landmark) -> LandmarkResponse {
    LandmarkResponse {
        coordinate: landmark.coordinate,
        id: landmark.id.clone(),
        name: landmark.name.clone(),
        owner_id: landmark.owner_id.clone(),
        visit_count: landmark.visit_count,
    }
}
