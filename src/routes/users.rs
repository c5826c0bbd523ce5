use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use crate::auth::{clear_session_cookie, require_user};
use crate::constants::{DEFAULT_PAGE_SIZE, ERR_NOTHING_TO_UPDATE};
use crate::db::{self, tables};
use crate::error::{AppError, Result};
use crate::models::user::validate_display_name;
use crate::models::{Preferences, PublicUser, UserRecord};
use crate::routes::validation::page_window;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListUsersParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<PublicUser>,
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub preferences: Option<Preferences>,
}

#[derive(Debug, Serialize)]
pub struct DeactivateResponse {
    pub success: bool,
    pub message: String,
}

/// Fetch a user's public profile
///
/// Deactivated accounts are indistinguishable from missing ones.
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<PublicUser>> {
    let db = state.db.clone();
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
        Some(user) if user.is_active => Ok(Json(PublicUser::from(&user))),
        _ => Err(AppError::UserNotFound),
    }
}

/// List active users, newest first, with pagination
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<UserListResponse>> {
    let (skip, take) = page_window(params.page, params.limit, DEFAULT_PAGE_SIZE);

    let db = state.db.clone();
    let (users, total) = tokio::task::spawn_blocking(move || -> Result<(Vec<UserRecord>, u64)> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::USERS)?;

        let mut users = Vec::new();
        for entry in table.iter()? {
            let (_, bytes) = entry?;
            let user: UserRecord = db::decode(bytes.value())?;
            if user.is_active {
                users.push(user);
            }
        }

        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = users.len() as u64;
        let users = users.into_iter().skip(skip).take(take).collect();
        Ok((users, total))
    })
    .await??;

    Ok(Json(UserListResponse {
        users: users.iter().map(PublicUser::from).collect(),
        total,
    }))
}

/// Update the current user's profile
///
/// Only the provided fields change; updatedAt is bumped alongside.
pub async fn update_profile(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<PublicUser>> {
    let session_user = require_user(&state, &jar).await?;

    if payload.display_name.is_none()
        && payload.avatar.is_none()
        && payload.bio.is_none()
        && payload.preferences.is_none()
    {
        return Err(AppError::InvalidInput(ERR_NOTHING_TO_UPDATE.to_string()));
    }

    if let Some(display_name) = &payload.display_name {
        validate_display_name(display_name).map_err(AppError::InvalidInput)?;
    }

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    let user = tokio::task::spawn_blocking(move || -> Result<UserRecord> {
        let write_txn = db.begin_write()?;
        let user = {
            let mut users = write_txn.open_table(tables::USERS)?;
            let mut user: UserRecord = match users.get(user_id.as_str())? {
                Some(bytes) => db::decode(bytes.value())?,
                None => return Err(AppError::UserNotFound),
            };

            if let Some(display_name) = payload.display_name {
                user.display_name = display_name;
            }
            if let Some(avatar) = payload.avatar {
                user.avatar = Some(avatar);
            }
            if let Some(bio) = payload.bio {
                user.bio = Some(bio);
            }
            if let Some(preferences) = payload.preferences {
                user.preferences = preferences;
            }
            user.updated_at = chrono::Utc::now().timestamp();

            let bytes = db::encode(&user)?;
            users.insert(user_id.as_str(), bytes.as_slice())?;
            user
        };
        write_txn.commit()?;
        Ok(user)
    })
    .await??;

    tracing::info!("Profile updated: {}", user.username);

    Ok(Json(PublicUser::from(&user)))
}

/// Deactivate the current user's account (soft delete)
///
/// The record stays in place with isActive=false so existing reviews
/// keep their author reference; the session cookie is cleared.
pub async fn deactivate_account(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<DeactivateResponse>)> {
    let session_user = require_user(&state, &jar).await?;

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut users = write_txn.open_table(tables::USERS)?;
            let mut user: UserRecord = match users.get(user_id.as_str())? {
                Some(bytes) => db::decode(bytes.value())?,
                None => return Err(AppError::UserNotFound),
            };

            user.is_active = false;
            user.updated_at = chrono::Utc::now().timestamp();

            let bytes = db::encode(&user)?;
            users.insert(user_id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    tracing::info!("Account deactivated: {}", session_user.username);

    let jar = jar.add(clear_session_cookie());
    Ok((
        jar,
        Json(DeactivateResponse {
            success: true,
            message: "Account deactivated".to_string(),
        }),
    ))
}
