use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::authenticate;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Public routes -- no session required
    let public_routes = Router::new()
        .route("/login/oauth2/token", post(handlers::login))
        .route("/_internal/health", get(handlers::health));

    // Member routes -- require a bearer session token
    let mut member_routes = Router::new()
        .route(
            "/api/members/my",
            get(handlers::my_info).patch(handlers::update_my_info),
        )
        .route(
            "/api/members/my/notice-token",
            post(handlers::register_notice_token),
        )
        .route("/api/spots", post(handlers::create_spot))
        .route("/api/spots/my", get(handlers::my_spots))
        .route("/api/spots/my/scraps", get(handlers::my_scraps))
        .route("/api/spots/map", get(handlers::map_spots))
        .route(
            "/api/spots/:spot_id",
            get(handlers::spot_detail).delete(handlers::delete_spot),
        )
        .route("/api/spots/:spot_id/like", post(handlers::toggle_like))
        .route("/api/spots/:spot_id/scrap", post(handlers::toggle_scrap))
        .route("/api/landmarks/:landmark_id", get(handlers::get_landmark))
        .route(
            "/api/landmarks/:landmark_id/visit",
            post(handlers::visit_landmark),
        )
        .route(
            "/api/landmarks/:landmark_id/occupy",
            post(handlers::occupy_landmark),
        );

    // Test-only routes -- dangerous operations gated behind TEST_MODE
    if state.config.test_mode {
        tracing::warn!("Test mode enabled — purge and landmark seeding routes are available.");
        member_routes = member_routes
            .route("/admin/purge", delete(handlers::admin_purge))
            .route("/admin/landmarks", post(handlers::create_landmark));
    }

    let member_routes = member_routes.route_layer(middleware::from_fn_with_state(
        Arc::clone(&state),
        authenticate,
    ));

    Router::new()
        .merge(public_routes)
        .merge(member_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
