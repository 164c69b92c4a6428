use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::{ApiError, JSend};
use crate::auth;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub expires_at: String,
    pub member_id: String,
    pub token: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST /login/oauth2/token` with header `Access-Token: "<provider> <token>"`.
///
/// Every failure — missing or malformed header, unknown provider, provider
/// rejecting the token — produces the same opaque 401. The distinction is
/// logged here and goes no further.
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<JSend<LoginResponse>>, ApiError> {
    let header = headers.get("Access-Token").and_then(|v| v.to_str().ok());

    match auth::login(&state, header).await {
        Ok(outcome) => Ok(JSend::success(LoginResponse {
            expires_at: outcome.session.expires_at.to_rfc3339(),
            member_id: outcome.member.id,
            token: outcome.session.token,
        })),
        Err(reason) => {
            tracing::debug!(reason = %reason, "Login rejected");
            Err(ApiError::unauthorized())
        }
    }
}
