//! Shared test helpers — available to all `#[cfg(test)]` modules in the crate.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;

use crate::auth::exchange::{ExchangeError, IdentityExchange, UserIdentity};
use crate::auth::provider::Provider;
use crate::config::{Config, LockConfig, NodeConfig, PushConfig, TokenConfig};
use crate::lock::LocalLocks;
use crate::notify::NoopPush;
use crate::storage::models::{Coordinate, Landmark, Member, Spot};
use crate::storage::Database;
use crate::AppState;

/// Open a fresh database in a temporary directory.
///
/// Returns both the `Database` and the `TempDir` guard — the caller must
/// keep the `TempDir` alive for the duration of the test.
pub fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path()).unwrap();
    (db, temp_dir)
}

/// A minimal `Config` suitable for unit tests (in-process locks, no push).
pub fn test_config() -> Config {
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

/// An identity exchange that never talks to the network.
///
/// Returns a fixed identity, or a fault when built with [`StubExchange::failing`].
pub struct StubExchange {
    identity: Option<UserIdentity>,
}

impl StubExchange {
    pub fn failing() -> Self {
        Self { identity: None }
    }
}

impl Default for StubExchange {
    fn default() -> Self {
        Self {
            identity: Some(UserIdentity {
                email: Some("stub@example.com".to_string()),
                image_url: None,
                nickname: Some("stub".to_string()),
                provider: Provider::Kakao,
                provider_key: "stub-key".to_string(),
            }),
        }
    }
}

#[async_trait]
impl IdentityExchange for StubExchange {
    async fn exchange(
        &self,
        provider: Provider,
        _access_token: &str,
    ) -> Result<UserIdentity, ExchangeError> {
        match &self.identity {
            Some(identity) => Ok(UserIdentity {
                provider,
                ..identity.clone()
            }),
            None => Err(ExchangeError::Denied(401)),
        }
    }
}

/// Build a full `Arc<AppState>` around the given database, with in-process
/// locks and a stub exchange returning a fixed identity.
pub fn test_state(db: Database) -> Arc<AppState> {
    test_state_with_exchange(db, StubExchange::default())
}

pub fn test_state_with_exchange(db: Database, exchange: StubExchange) -> Arc<AppState> {
    Arc::new(AppState {
        config: test_config(),
        db,
        exchange: Arc::new(exchange),
        locks: Arc::new(LocalLocks::new()),
        push: Arc::new(NoopPush),
    })
}

/// Create a `Member` with the given id and provider identity.
pub fn make_member(id: &str, provider: Provider, provider_key: &str) -> Member {
    Member {
        created_at: Utc::now(),
        email: None,
        id: id.to_string(),
        image_url: None,
        nickname: format!("member-{id}"),
        notice_token: None,
        point: 0,
        provider,
        provider_key: provider_key.to_string(),
    }
}

/// Create a `Spot` owned by the given member.
pub fn make_spot(id: &str, member_id: &str) -> Spot {
    Spot {
        coordinate: Coordinate {
            lat: 37.55,
            lng: 126.99,
        },
        created_at: Utc::now(),
        deleted: false,
        id: id.to_string(),
        image_url: format!("https://img.example.com/{id}.jpg"),
        landmark_id: None,
        like_count: 0,
        member_id: member_id.to_string(),
        scrap_count: 0,
        tags: vec![],
    }
}

/// Create an unowned `Landmark` with the given id and name.
pub fn make_landmark(id: &str, name: &str) -> Landmark {
    Landmark {
        coordinate: Coordinate {
            lat: 37.55,
            lng: 126.99,
        },
        id: id.to_string(),
        name: name.to_string(),
        owner_id: None,
        visit_count: 0,
    }
}
