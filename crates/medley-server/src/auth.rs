//! Accounts: password hashing, bearer sessions and the request extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::db::{users, Database, Session, User};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 32;
const PASSWORD_MIN: usize = 8;

/// Issued on register and login
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionGrant {
    pub token: String,
    pub username: String,
    /// RFC 3339
    pub expires_at: String,
}

pub fn new_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Hex SHA-256 of `salt:password`
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let actual = hash_password(password, salt);
    if actual.len() != expected_hash.len() {
        return false;
    }
    // Compare every byte so timing does not depend on the first mismatch
    actual
        .bytes()
        .zip(expected_hash.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

pub fn validate_username(username: &str) -> ApiResult<()> {
    let len = username.chars().count();
    let allowed = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));

    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) || !allowed {
        return Err(ApiError::BadRequest(format!(
            "Username must be {}-{} characters of letters, digits, '_', '.' or '-'",
            USERNAME_MIN, USERNAME_MAX
        )));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> ApiResult<()> {
    if password.chars().count() < PASSWORD_MIN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN
        )));
    }
    Ok(())
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn rfc3339(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .unwrap_or_default()
        .to_rfc3339()
}

fn open_session(conn: &rusqlite::Connection, user: &User, ttl: chrono::Duration) -> crate::db::DbResult<SessionGrant> {
    let now = Utc::now().timestamp();
    let session = Session {
        token: Uuid::new_v4().to_string(),
        user_id: user.id,
        expires_at: now + ttl.num_seconds(),
    };
    users::purge_expired_sessions(conn, now)?;
    users::create_session(conn, &session, now)?;

    Ok(SessionGrant {
        token: session.token,
        username: user.username.clone(),
        expires_at: rfc3339(session.expires_at),
    })
}

/// Create an account and log it in
pub async fn register(
    db: &Database,
    username: String,
    password: String,
    ttl: chrono::Duration,
) -> ApiResult<SessionGrant> {
    validate_username(&username)?;
    validate_password(&password)?;

    let salt = new_salt();
    let hash = hash_password(&password, &salt);

    let grant = db
        .run(move |conn| {
            let user = users::create_user(conn, &username, &hash, &salt, Utc::now().timestamp())?;
            open_session(conn, &user, ttl)
        })
        .await?;

    info!(username = %grant.username, "registered account");
    Ok(grant)
}

pub async fn login(
    db: &Database,
    username: String,
    password: String,
    ttl: chrono::Duration,
) -> ApiResult<SessionGrant> {
    let grant = db
        .run(move |conn| {
            let user = users::get_user_by_username(conn, &username)?
                .filter(|user| verify_password(&password, &user.salt, &user.password_hash));
            user.map(|user| open_session(conn, &user, ttl)).transpose()
        })
        .await?;

    grant.ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))
}

pub async fn logout(db: &Database, token: String) -> ApiResult<()> {
    db.run(move |conn| users::delete_session(conn, &token)).await?;
    Ok(())
}

/// User owning a live session token
pub async fn authenticate(db: &Database, token: String) -> ApiResult<User> {
    let user = db
        .run(move |conn| users::get_session_user(conn, &token, Utc::now().timestamp()))
        .await?;
    user.ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))
}

/// Extractor for routes that need a logged-in user
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?
            .to_string();

        let user = authenticate(state.db()?, token.clone()).await?;
        Ok(AuthUser { user, token })
    }
}
