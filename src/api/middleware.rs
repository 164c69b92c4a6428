//! Session authentication middleware
//!
//! Resolves the bearer session token into a `CurrentMember` request
//! extension. Handlers receive the principal as an explicit extractor
//! argument; there is no ambient security context.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, Response},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::tokens::session;
use crate::AppState;

/// The authenticated principal for the current request.
#[derive(Debug, Clone)]
pub struct CurrentMember {
    pub id: String,
    pub nickname: String,
}

/// Middleware guarding the `/api` routes.
///
/// Expects `Authorization: Bearer <session-token>`. A valid, unexpired
/// session inserts [`CurrentMember`] into the request extensions and passes
/// the request through; anything else is the uniform 401.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let token = match bearer_token(&request) {
        Some(token) => token.to_string(),
        None => return ApiError::unauthorized().into_response(),
    };

    let session = match session::validate(&state.db, &token) {
        Ok(Some(session)) => session,
        Ok(None) => return ApiError::unauthorized().into_response(),
        Err(e) => return ApiError::internal(e.to_string()).into_response(),
    };

    let member = match state.db.get_member(&session.member_id) {
        Ok(Some(member)) => member,
        Ok(None) => {
            // Session outlived its member record
            tracing::warn!(member_id = %session.member_id, "Session for unknown member");
            return ApiError::unauthorized().into_response();
        }
        Err(e) => return ApiError::internal(e.to_string()).into_response(),
    };

    request.extensions_mut().insert(CurrentMember {
        id: member.id,
        nickname: member.nickname,
    });

    next.run(request).await
}

fn bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
