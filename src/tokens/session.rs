use chrono::{Duration, Utc};
use thiserror::Error;

use crate::storage::models::Session;
use crate::storage::Database;

use super::generator::generate_token;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Database error: {0}")]
    Database(#[from] crate::storage::DatabaseError),
}

/// Create a new session for a member
pub fn create(db: &Database, member_id: &str, ttl_seconds: u64) -> Result<Session, SessionError> {
    let now = Utc::now();
    let session = Session {
        created_at: now,
        expires_at: now + Duration::seconds(ttl_seconds as i64),
        id: uuid::Uuid::new_v4().to_string(),
        member_id: member_id.to_string(),
        token: generate_token(),
    };

    db.put_session(&session)?;
    tracing::debug!(id = %session.id, member_id = %member_id, "Created session");

    Ok(session)
}

/// Validate a session token, returning it if valid
pub fn validate(db: &Database, token: &str) -> Result<Option<Session>, SessionError> {
    match db.get_session(token)? {
        Some(session) => {
            if session.expires_at < Utc::now() {
                // Expired - delete it and report no session
                let _ = db.delete_session(token);
                tracing::debug!(id = %session.id, "Session expired");
                Ok(None)
            } else {
                Ok(Some(session))
            }
        }
        None => Ok(None),
    }
}

/// Remove all expired sessions, returning how many were removed
pub fn cleanup_expired(db: &Database) -> Result<u64, SessionError> {
    Ok(db.cleanup_expired_sessions()?)
}
