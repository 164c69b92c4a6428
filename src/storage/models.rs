use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::provider::Provider;

/// A (longitude, latitude) pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// A registered member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// When the member first signed in
    pub created_at: DateTime<Utc>,
    pub email: Option<String>,
    /// Profile image URL, as reported by the identity provider
    pub image_url: Option<String>,
    /// Non-secret UUID identifier
    pub id: String,
    pub nickname: String,
    /// Device token for push notifications, registered by the client
    pub notice_token: Option<String>,
    /// Activity points. Never goes negative.
    pub point: u64,
    /// Which social vendor authenticated this member
    pub provider: Provider,
    /// The member's identifier at the provider (e.g. Kakao account id)
    pub provider_key: String,
}

/// A photo spot posted by a member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spot {
    pub coordinate: Coordinate,
    pub created_at: DateTime<Utc>,
    /// Soft-delete flag; deleted spots are hidden from queries
    pub deleted: bool,
    pub id: String,
    pub image_url: String,
    /// Landmark this spot was taken at, if any
    pub landmark_id: Option<String>,
    pub like_count: u64,
    pub member_id: String,
    pub scrap_count: u64,
    pub tags: Vec<String>,
}

/// A named landmark on the map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Landmark {
    pub coordinate: Coordinate,
    pub id: String,
    pub name: String,
    /// Current representative member. None until someone claims it.
    pub owner_id: Option<String>,
    pub visit_count: u64,
}

/// A like edge between a member and a spot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    pub created_at: DateTime<Utc>,
    pub member_id: String,
    pub spot_id: String,
}

/// A scrap (bookmark) edge between a member and a spot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scrap {
    pub created_at: DateTime<Utc>,
    pub member_id: String,
    pub spot_id: String,
}

/// An authenticated session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Non-secret UUID identifier
    pub id: String,
    pub member_id: String,
    /// Opaque secret token (32-byte hex)
    pub token: String,
}
