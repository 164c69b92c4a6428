//! waypoint - a location-based social backend
//!
//! This crate provides the HTTP service for a photo-spot social app:
//! - Implicit-grant social login (Kakao / Naver / Google access tokens)
//! - Opaque session tokens with active expiration
//! - Spots with likes and scraps; like toggles serialized by named locks
//! - Landmarks with visits, ownership claims and push notifications
//! - redb embedded database (ACID, MVCC, crash-safe)
//! - REST API

pub mod api;
pub mod auth;
pub mod config;
pub mod expiration;
pub mod lock;
pub mod notify;
pub mod storage;
#[cfg(test)]
pub mod testutil;
pub mod tokens;

use std::sync::Arc;

use auth::exchange::IdentityExchange;
use config::Config;
use lock::LockProvider;
use notify::PushSender;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub exchange: Arc<dyn IdentityExchange>,
    pub locks: Arc<dyn LockProvider>,
    pub push: Arc<dyn PushSender>,
}
