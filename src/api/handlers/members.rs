use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::middleware::CurrentMember;
use crate::api::response::{ApiError, JSend};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct MemberInfoResponse {
    pub image_url: Option<String>,
    pub nickname: String,
    pub point: u64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateMemberRequest {
    pub nickname: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NoticeTokenRequest {
    pub token: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn my_info(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentMember>,
) -> Result<Json<JSend<MemberInfoResponse>>, ApiError> {
    let member = state
        .db
        .get_member(&current.id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Member not found"))?;

    Ok(JSend::success(MemberInfoResponse {
        image_url: member.image_url,
        nickname: member.nickname,
        point: member.point,
    }))
}

pub async fn update_my_info(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentMember>,
    Json(req): Json<UpdateMemberRequest>,
) -> Result<Json<JSend<MemberInfoResponse>>, ApiError> {
    let nickname = req.nickname.trim();
    if nickname.is_empty() {
        return Err(ApiError::bad_request("nickname is required"));
    }
    if nickname.chars().count() > 20 {
        return Err(ApiError::bad_request("nickname must be at most 20 characters"));
    }

    let nickname = nickname.to_string();
    let member = state
        .db
        .update_member(&current.id, |m| m.nickname = nickname)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Member not found"))?;

    tracing::debug!(member_id = %current.id, "Updated member nickname");

    Ok(JSend::success(MemberInfoResponse {
        image_url: member.image_url,
        nickname: member.nickname,
        point: member.point,
    }))
}

/// Register the device token push notifications are delivered to
pub async fn register_notice_token(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentMember>,
    Json(req): Json<NoticeTokenRequest>,
) -> Result<Json<JSend<()>>, ApiError> {
    if req.token.trim().is_empty() {
        return Err(ApiError::bad_request("token is required"));
    }

    state
        .db
        .update_member(&current.id, |m| m.notice_token = Some(req.token))
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Member not found"))?;

    tracing::debug!(member_id = %current.id, "Registered notice token");
    Ok(JSend::success(()))
}
