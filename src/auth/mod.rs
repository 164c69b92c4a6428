//! Implicit-grant login: the client already holds a provider access token
//! and presents it as `Access-Token: "<provider> <token>"`. The adapter
//! parses the header, exchanges the token with the provider, upserts the
//! member and mints an opaque session token.
//!
//! Every failure variant maps to one opaque authentication-failure response
//! externally. The variant is kept for internal logging only; callers must
//! not be able to tell a bad header from a rejected token.

pub mod exchange;
pub mod provider;

use chrono::Utc;
use thiserror::Error;

use crate::storage::models::Member;
use crate::storage::models::Session;
use crate::tokens::{generator::generate_nickname, session};
use crate::AppState;

use exchange::{ExchangeError, UserIdentity};
use provider::Provider;

/// Why a login attempt failed. Internal taxonomy; never serialized to the
/// client.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Session store error: {0}")]
    Database(#[from] crate::storage::DatabaseError),
    #[error("Identity exchange failed: {0}")]
    Exchange(#[from] ExchangeError),
    #[error("Access-Token header is not \"<provider> <token>\"")]
    MalformedHeader,
    #[error("Access-Token header missing")]
    MissingHeader,
    #[error("Session error: {0}")]
    Session(#[from] session::SessionError),
    #[error(transparent)]
    UnknownProvider(#[from] provider::UnknownProvider),
}

/// A successful login
#[derive(Debug)]
pub struct LoginOutcome {
    pub member: Member,
    pub session: Session,
}

/// Split an `Access-Token` header into provider tag and opaque token.
/// Exactly two space-separated parts are accepted.
fn parse_header(value: &str) -> Result<(Provider, &str), AuthError> {
    let parts: Vec<&str> = value.split(' ').collect();
    let &[tag, token] = parts.as_slice() else {
        return Err(AuthError::MalformedHeader);
    };
    if tag.is_empty() || token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok((Provider::parse(tag)?, token))
}

/// Perform the full implicit-grant login for an `Access-Token` header value.
pub async fn login(state: &AppState, header: Option<&str>) -> Result<LoginOutcome, AuthError> {
    let value = header.ok_or(AuthError::MissingHeader)?;
    let (provider, access_token) = parse_header(value)?;

    let identity = state.exchange.exchange(provider, access_token).await?;
    let member = upsert_member(state, &identity)?;

    let ttl = state.config.tokens.session_ttl_seconds;
    let session = session::create(&state.db, &member.id, ttl)?;

    tracing::info!(member_id = %member.id, provider = %provider, "Member logged in");
    Ok(LoginOutcome { member, session })
}

/// Find the member this identity belongs to, or register a new one.
fn upsert_member(state: &AppState, identity: &UserIdentity) -> Result<Member, AuthError> {
    if let Some(member) = state
        .db
        .find_member_by_provider(identity.provider, &identity.provider_key)?
    {
        return Ok(member);
    }

    let member = Member {
        created_at: Utc::now(),
        email: identity.email.clone(),
        id: uuid::Uuid::new_v4().to_string(),
        image_url: identity.image_url.clone(),
        nickname: identity
            .nickname
            .clone()
            .unwrap_or_else(generate_nickname),
        notice_token: None,
        point: 0,
        provider: identity.provider,
        provider_key: identity.provider_key.clone(),
    };
    state.db.put_member(&member)?;

    tracing::info!(member_id = %member.id, provider = %member.provider, "Registered new member");
    Ok(member)
}
