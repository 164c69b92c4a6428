//! Token authentication adapter properties, exercised through the router.
//!
//! Every failure mode must produce the same opaque 401 body; a valid header
//! must bind the minted session to the identity the exchange vouched for.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use waypoint::api;
use waypoint::auth::exchange::{ExchangeError, IdentityExchange, UserIdentity};
use waypoint::auth::provider::Provider;
use waypoint::config::{Config, LockConfig, NodeConfig, PushConfig, TokenConfig};
use waypoint::lock::{LocalLocks, LockProvider};
use waypoint::notify::NoopPush;
use waypoint::storage::Database;
use waypoint::AppState;

// ============================================================================
// Fixtures
// ============================================================================

struct StubExchange {
    fail: bool,
}

#[async_trait]
impl IdentityExchange for StubExchange {
    async fn exchange(
        &self,
        provider: Provider,
        _access_token: &str,
    ) -> Result<UserIdentity, ExchangeError> {
        if self.fail {
            return Err(ExchangeError::Denied(401));
        }
        Ok(UserIdentity {
            email: Some("bird@example.com".to_string()),
            image_url: None,
            nickname: Some("bird".to_string()),
            provider,
            provider_key: "prov-123".to_string(),
        })
    }
}

fn test_config() -> Config {
    Config {
        locks: LockConfig::default(),
        node: NodeConfig {
            bind_address: "127.0.0.1:8080".to_string(),
            data_dir: "/tmp/test".to_string(),
        },
        push: PushConfig::default(),
        test_mode: false,
        tokens: TokenConfig::default(),
    }
}

fn make_state(fail_exchange: bool) -> (Arc<AppState>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path()).unwrap();
    let state = Arc::new(AppState {
        config: test_config(),
        db,
        exchange: Arc::new(StubExchange {
            fail: fail_exchange,
        }),
        locks: Arc::new(LocalLocks::new()),
        push: Arc::new(NoopPush),
    });
    (state, temp_dir)
}

async fn post_login(state: &Arc<AppState>, header: Option<&str>) -> (StatusCode, Value) {
    let app = api::create_router(Arc::clone(state));

    let mut builder = Request::builder().method("POST").uri("/login/oauth2/token");
    if let Some(value) = header {
        builder = builder.header("Access-Token", value);
    }
    let request = builder.body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn valid_header_establishes_a_session_for_the_identity() {
    let (state, _temp) = make_state(false);

    let (status, body) = post_login(&state, Some("kakao opaque-token")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let token = body["data"]["token"].as_str().unwrap();
    let member_id = body["data"]["member_id"].as_str().unwrap();

    // The session resolves back to the member the exchange vouched for
    let session = state.db.get_session(token).unwrap().unwrap();
    assert_eq!(session.member_id, member_id);

    let member = state.db.get_member(member_id).unwrap().unwrap();
    assert_eq!(member.provider_key, "prov-123");
    assert_eq!(member.nickname, "bird");

    // The bearer token now opens the member routes
    let app = api::create_router(Arc::clone(&state));
    let request = Request::builder()
        .uri("/api/members/my")
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn all_failure_modes_produce_the_same_opaque_401() {
    let (state, _temp) = make_state(false);

    // Missing header, missing separator, unknown provider
    let (status_missing, body_missing) = post_login(&state, None).await;
    let (status_nospace, body_nospace) = post_login(&state, Some("kakaotoken")).await;
    let (status_unknown, body_unknown) = post_login(&state, Some("facebook token")).await;

    for status in [status_missing, status_nospace, status_unknown] {
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // Opaque: the caller cannot tell which step failed
    assert_eq!(body_missing, body_nospace);
    assert_eq!(body_missing, body_unknown);

    // No member was created along the way
    assert!(state
        .db
        .find_member_by_provider(Provider::Kakao, "prov-123")
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn exchange_fault_is_the_same_opaque_401() {
    let (failing, _temp_a) = make_state(true);
    let (healthy, _temp_b) = make_state(false);

    let (status, fault_body) = post_login(&failing, Some("kakao valid-looking")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, malformed_body) = post_login(&healthy, Some("kakaotoken")).await;
    assert_eq!(fault_body, malformed_body);
}

#[tokio::test]
async fn extra_token_parts_are_rejected() {
    let (state, _temp) = make_state(false);

    let (status, _) = post_login(&state, Some("kakao token extra")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn like_toggle_returns_busy_while_spot_is_locked() {
    let (state, _temp) = make_state(false);

    // Log in and post a spot
    let (_, login_body) = post_login(&state, Some("kakao tok")).await;
    let token = login_body["data"]["token"].as_str().unwrap().to_string();

    let app = api::create_router(Arc::clone(&state));
    let request = Request::builder()
        .method("POST")
        .uri("/api/spots")
        .header("Authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({
                "coordinate": { "lng": 126.99, "lat": 37.55 },
                "image_url": "https://img.example.com/s.jpg",
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let spot_id = body["data"]["id"].as_str().unwrap().to_string();

    // Someone else is holding the spot's named lock
    let _held = state
        .locks
        .acquire(&format!("spot:{spot_id}"), Duration::from_secs(1))
        .await
        .unwrap();

    // Wait bound is config-driven; shrink it so the test fails fast
    let mut config = test_config();
    config.locks.wait_seconds = 1;
    let busy_state = Arc::new(AppState {
        config,
        db: state.db.clone(),
        exchange: Arc::new(StubExchange { fail: false }),
        locks: Arc::clone(&state.locks),
        push: Arc::new(NoopPush),
    });

    let app = api::create_router(busy_state);
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/spots/{spot_id}/like"))
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // The like never happened
    let spot = state.db.get_spot(&spot_id).unwrap().unwrap();
    assert_eq!(spot.like_count, 0);
}
