use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::ListParams;
use crate::api::middleware::CurrentMember;
use crate::api::response::{ApiError, JSend, JSendPaginated, Pagination};
use crate::lock::{self, LockError};
use crate::storage::models::{Coordinate, Spot};
use crate::storage::{SpotDelete, ToggleState};
use crate::AppState;

/// Points awarded for posting a spot
const SPOT_POST_POINTS: u64 = 50;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateSpotRequest {
    pub coordinate: Coordinate,
    pub image_url: String,
    #[serde(default)]
    pub landmark_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSpotResponse {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpotResponse {
    pub coordinate: Coordinate,
    pub created_at: String,
    pub id: String,
    pub image_url: String,
    pub landmark_id: Option<String>,
    pub like_count: u64,
    pub member_id: String,
    pub scrap_count: u64,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpotDetailResponse {
    #[serde(flatten)]
    pub spot: SpotResponse,
    /// Whether the requesting member has liked this spot
    pub liked: bool,
    /// Whether the requesting member has scrapped this spot
    pub scrapped: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub active: bool,
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub struct MapParams {
    pub east: f64,
    pub north: f64,
    pub south: f64,
    pub west: f64,
}

impl MapParams {
    fn validate(&self) -> Result<(), ApiError> {
        if self.west >= self.east || self.south >= self.north {
            return Err(ApiError::bad_request("invalid map bounds"));
        }
        Ok(())
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_spot(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentMember>,
    Json(req): Json<CreateSpotRequest>,
) -> Result<(StatusCode, Json<JSend<CreateSpotResponse>>), ApiError> {
    if req.image_url.trim().is_empty() {
        return Err(ApiError::bad_request("image_url is required"));
    }

    // A spot attached to a landmark counts as a visit there
    if let Some(landmark_id) = &req.landmark_id {
        state
            .db
            .visit_landmark(landmark_id)
            .map_err(|e| ApiError::internal(e.to_string()))?
            .ok_or_else(|| ApiError::not_found("Landmark not found"))?;
    }

    let spot = Spot {
        coordinate: req.coordinate,
        created_at: Utc::now(),
        deleted: false,
        id: uuid::Uuid::new_v4().to_string(),
        image_url: req.image_url,
        landmark_id: req.landmark_id,
        like_count: 0,
        member_id: current.id.clone(),
        scrap_count: 0,
        tags: req.tags,
    };

    state
        .db
        .put_spot(&spot)
        .map_err(|e| ApiError::internal(format!("Failed to store spot: {e}")))?;

    state
        .db
        .add_point(&current.id, SPOT_POST_POINTS)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::debug!(spot_id = %spot.id, member_id = %current.id, "Created spot");

    Ok((
        StatusCode::CREATED,
        JSend::success(CreateSpotResponse { id: spot.id }),
    ))
}

pub async fn spot_detail(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentMember>,
    Path(spot_id): Path<String>,
) -> Result<Json<JSend<SpotDetailResponse>>, ApiError> {
    let spot = state
        .db
        .get_spot(&spot_id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .filter(|s| !s.deleted)
        .ok_or_else(|| ApiError::not_found("Spot not found"))?;

    let liked = state
        .db
        .has_liked(&current.id, &spot_id)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let scrapped = state
        .db
        .has_scrapped(&current.id, &spot_id)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(JSend::success(SpotDetailResponse {
        spot: spot_to_response(&spot),
        liked,
        scrapped,
    }))
}

pub async fn delete_spot(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentMember>,
    Path(spot_id): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    match state
        .db
        .delete_spot(&spot_id, &current.id)
        .map_err(|e| ApiError::internal(e.to_string()))?
    {
        SpotDelete::Deleted => {
            tracing::debug!(spot_id = %spot_id, "Deleted spot");
            Ok(JSend::success(()))
        }
        SpotDelete::AlreadyDeleted => Err(ApiError::conflict("Spot is already deleted")),
        SpotDelete::NotFound => Err(ApiError::not_found("Spot not found")),
    }
}

pub async fn my_spots(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentMember>,
    Query(params): Query<ListParams>,
) -> Result<Json<JSendPaginated<SpotResponse>>, ApiError> {
    params.validate()?;

    let spots = state
        .db
        .list_spots_by_member(&current.id)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(paginate(spots, &params))
}

pub async fn my_scraps(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentMember>,
    Query(params): Query<ListParams>,
) -> Result<Json<JSendPaginated<SpotResponse>>, ApiError> {
    params.validate()?;

    let spots = state
        .db
        .list_scrapped_spots(&current.id)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(paginate(spots, &params))
}

pub async fn map_spots(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MapParams>,
) -> Result<Json<JSend<Vec<SpotResponse>>>, ApiError> {
    params.validate()?;

    let spots = state
        .db
        .list_spots_in_bounds(params.west, params.south, params.east, params.north)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(JSend::success(
        spots.iter().map(spot_to_response).collect(),
    ))
}

/// Toggle the requesting member's like on a spot.
///
/// Likes mutate a shared counter, so toggles on the same spot are serialized
/// under the named lock `spot:<id>`; toggles on different spots run freely.
/// A lock wait that exceeds the configured bound fails with 503 and never
/// runs the toggle.
pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentMember>,
    Path(spot_id): Path<String>,
) -> Result<Json<JSend<ToggleResponse>>, ApiError> {
    let key = format!("spot:{spot_id}");
    let wait = Duration::from_secs(state.config.locks.wait_seconds);

    let db = state.db.clone();
    let member_id = current.id.clone();
    let id = spot_id.clone();

    let toggled = lock::with_lock(state.locks.as_ref(), &key, wait, || async move {
        db.toggle_like(&member_id, &id)
    })
    .await
    .map_err(|e| match e {
        LockError::Timeout(key) => {
            tracing::debug!(key = %key, "Like toggle timed out waiting for lock");
            ApiError::busy("Spot is being updated, try again")
        }
        LockError::Backend(msg) => ApiError::internal(msg),
    })?
    .map_err(|e| ApiError::internal(e.to_string()))?;

    toggle_response(toggled, &spot_id, &current.id, "like")
}

/// Toggle the requesting member's scrap on a spot. Scrap counters are only
/// shown to the owner, so this path skips the named lock.
pub async fn toggle_scrap(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentMember>,
    Path(spot_id): Path<String>,
) -> Result<Json<JSend<ToggleResponse>>, ApiError> {
    let toggled = state
        .db
        .toggle_scrap(&current.id, &spot_id)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    toggle_response(toggled, &spot_id, &current.id, "scrap")
}

// ============================================================================
// Helpers
// ============================================================================

fn toggle_response(
    toggled: Option<ToggleState>,
    spot_id: &str,
    member_id: &str,
    kind: &str,
) -> Result<Json<JSend<ToggleResponse>>, ApiError> {
    match toggled {
        Some(st) => {
            tracing::debug!(
                spot_id = %spot_id,
                member_id = %member_id,
                active = st.active,
                "Toggled {kind}"
            );
            Ok(JSend::success(ToggleResponse {
                active: st.active,
                count: st.count,
            }))
        }
        None => Err(ApiError::not_found("Spot not found")),
    }
}

fn paginate(spots: Vec<Spot>, params: &ListParams) -> Json<JSendPaginated<SpotResponse>> {
    let total = spots.len() as u64;
    let items: Vec<SpotResponse> = spots
        .iter()
        .skip(params.offset as usize)
        .take(params.limit as usize)
        .map(spot_to_response)
        .collect();

    JSendPaginated::success(
        items,
        Pagination {
            limit: params.limit,
            offset: params.offset,
            total,
        },
    )
}

fn spot_to_response(spot: &Spot) -> SpotResponse {
    SpotResponse {
        coordinate: spot.coordinate,
        created_at: spot.created_at.to_rfc3339(),
        id: spot.id.clone(),
        image_url: spot.image_url.clone(),
        landmark_id: spot.landmark_id.clone(),
        like_count: spot.like_count,
        member_id: spot.member_id.clone(),
        scrap_count: spot.scrap_count,
        tags: spot.tags.clone(),
    }
}
