use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use crate::auth::{
    clear_session_cookie, hash_password, issue_token, require_user, session_cookie,
    verify_password,
};
use crate::db::{self, tables};
use crate::error::{AppError, Result};
use crate::models::user::{
    validate_display_name, validate_email, validate_password, validate_username,
};
use crate::models::{generate_id, Preferences, PublicUser, UserRecord, UserStats};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub password: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: PublicUser,
}

/// Register a new user
///
/// Validates the signup fields, rejects taken emails and usernames,
/// stores the bcrypt-hashed password, and starts a session by setting
/// the auth cookie.
pub async fn register_user(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    // 1. Validate input
    if !validate_email(&payload.email) {
        return Err(AppError::InvalidInput("Invalid email".to_string()));
    }
    validate_password(&payload.password).map_err(AppError::InvalidInput)?;
    validate_username(&payload.username).map_err(AppError::InvalidInput)?;
    validate_display_name(&payload.display_name).map_err(AppError::InvalidInput)?;

    let db = state.db.clone();
    let cost = state.config.bcrypt_cost;

    let user = tokio::task::spawn_blocking(move || -> Result<UserRecord> {
        // 2. Hash before opening the write transaction; bcrypt is slow
        let password_hash = hash_password(&payload.password, cost)?;

        let write_txn = db.begin_write()?;
        let user = {
            let mut users = write_txn.open_table(tables::USERS)?;
            let mut by_email = write_txn.open_table(tables::USERS_BY_EMAIL)?;
            let mut by_username = write_txn.open_table(tables::USERS_BY_USERNAME)?;

            // 3. Reject taken email or username
            if by_email.get(payload.email.as_str())?.is_some()
                || by_username.get(payload.username.as_str())?.is_some()
            {
                return Err(AppError::EmailOrUsernameTaken);
            }

            let now = chrono::Utc::now().timestamp();
            let user = UserRecord {
                id: generate_id(),
                email: payload.email.clone(),
                username: payload.username.clone(),
                display_name: payload.display_name.clone(),
                password_hash,
                avatar: payload.avatar.clone(),
                bio: payload.bio.clone(),
                created_at: now,
                updated_at: now,
                is_active: true,
                email_verified: false,
                last_login: None,
                preferences: Preferences::default(),
                stats: UserStats::default(),
            };

            // 4. Insert the record and both unique indexes
            let bytes = db::encode(&user)?;
            users.insert(user.id.as_str(), bytes.as_slice())?;
            by_email.insert(user.email.as_str(), user.id.as_str())?;
            by_username.insert(user.username.as_str(), user.id.as_str())?;
            user
        };
        write_txn.commit()?;
        Ok(user)
    })
    .await??;

    tracing::info!("New user registered: {}", user.username);

    // 5. Issue the session token and set the cookie
    let token = issue_token(&user, &state.config.jwt_secret)?;
    let jar = jar.add(session_cookie(token.clone(), state.config.is_production()));

    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            message: "User registered successfully".to_string(),
            user: PublicUser::from(&user),
            token,
        }),
    ))
}

/// Log a user in
///
/// Unknown emails and wrong passwords fail identically with a generic
/// invalid-credentials error; deactivated accounts are rejected
/// explicitly. A successful login records the login time and sets the
/// auth cookie.
pub async fn login_user(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Email and password are required".to_string(),
        ));
    }

    let db = state.db.clone();
    let user = tokio::task::spawn_blocking(move || -> Result<UserRecord> {
        let write_txn = db.begin_write()?;
        let user = {
            let mut users = write_txn.open_table(tables::USERS)?;
            let by_email = write_txn.open_table(tables::USERS_BY_EMAIL)?;

            // 1. Look the user up by email
            let user_id = match by_email.get(payload.email.as_str())? {
                Some(id) => id.value().to_string(),
                None => return Err(AppError::InvalidCredentials),
            };
            let mut user: UserRecord = match users.get(user_id.as_str())? {
                Some(bytes) => db::decode(bytes.value())?,
                None => return Err(AppError::InvalidCredentials),
            };

            // 2. Deactivated accounts cannot log in
            if !user.is_active {
                return Err(AppError::AccountDisabled);
            }

            // 3. Verify the password
            if !verify_password(&payload.password, &user.password_hash) {
                return Err(AppError::InvalidCredentials);
            }

            // 4. Record the login
            let now = chrono::Utc::now().timestamp();
            user.last_login = Some(now);
            user.updated_at = now;
            let bytes = db::encode(&user)?;
            users.insert(user.id.as_str(), bytes.as_slice())?;
            user
        };
        write_txn.commit()?;
        Ok(user)
    })
    .await??;

    tracing::info!("User logged in: {}", user.username);

    let token = issue_token(&user, &state.config.jwt_secret)?;
    let jar = jar.add(session_cookie(token.clone(), state.config.is_production()));

    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            message: "Login successful".to_string(),
            user: PublicUser::from(&user),
            token,
        }),
    ))
}

/// Log the user out by clearing the session cookie
pub async fn logout_user(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    let jar = jar.add(clear_session_cookie());

    (
        jar,
        Json(LogoutResponse {
            success: true,
            message: "Logged out successfully".to_string(),
        }),
    )
}

/// Return the user behind the current session
pub async fn current_user(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<MeResponse>> {
    let user = require_user(&state, &jar).await?;

    Ok(Json(MeResponse {
        success: true,
        user: PublicUser::from(&user),
    }))
}
