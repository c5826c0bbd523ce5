use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use crate::constants::{AUTH_COOKIE, SESSION_TTL_SECS};
use crate::db::{self, tables};
use crate::error::{AppError, Result};
use crate::models::UserRecord;
use crate::AppState;

// =============================================================================
// Password Hashing
// =============================================================================

/// Hash a password with bcrypt at the configured cost
///
/// bcrypt is CPU-bound; callers hash inside `spawn_blocking` alongside
/// their store work.
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Verify a password against a stored bcrypt hash
///
/// A malformed stored hash verifies as false rather than erroring, so
/// login failures stay indistinguishable from unknown accounts.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}

// =============================================================================
// Session Tokens
// =============================================================================

/// Claims carried by the session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Application-level user id
    pub sub: String,
    pub email: String,
    pub username: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// Issued-at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds), fixed 7 days after issue
    pub exp: i64,
}

/// Issue a signed session token for a user (HS256, 7-day expiry)
pub fn issue_token(user: &UserRecord, secret: &str) -> Result<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        username: user.username.clone(),
        display_name: user.display_name.clone(),
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Verify a session token, returning its claims
///
/// Expired, tampered or otherwise malformed tokens all come back as None.
pub fn verify_token(token: &str, secret: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

// =============================================================================
// Session Cookie
// =============================================================================

/// Build the session cookie carrying a freshly issued token
pub fn session_cookie(token: String, production: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(production)
        .max_age(time::Duration::seconds(SESSION_TTL_SECS))
        .build()
}

/// Build the removal cookie that clears the session
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .build()
}

/// Extract and verify the session claims from the cookie jar
pub fn claims_from_jar(jar: &CookieJar, secret: &str) -> Option<Claims> {
    let token = jar.get(AUTH_COOKIE)?.value().to_string();
    verify_token(&token, secret)
}

/// Resolve the session to a live user record
///
/// Fails with `Unauthorized` when the cookie is missing or invalid, or
/// when the user no longer exists or has been deactivated.
pub async fn require_user(state: &AppState, jar: &CookieJar) -> Result<UserRecord> {
    let claims = claims_from_jar(jar, &state.config.jwt_secret).ok_or(AppError::Unauthorized)?;

    let db = state.db.clone();
    let user_id = claims.sub;
    let user = tokio::task::spawn_blocking(move || -> Result<Option<UserRecord>> {
        let read_txn = db.begin_read()?;
        let users = read_txn.open_table(tables::USERS)?;
        let user = match users.get(user_id.as_str())? {
            Some(bytes) => Some(db::decode::<UserRecord>(bytes.value())?),
            None => None,
        };
        Ok(user)
    })
    .await??;

    match user {
        Some(user) if user.is_active => Ok(user),
        _ => Err(AppError::Unauthorized),
    }
}
