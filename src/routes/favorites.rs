use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use redb::ReadableTable;
use serde::Serialize;

use crate::auth::require_user;
use crate::constants::ERR_EMPTY_BOOK_ID;
use crate::db::{self, tables};
use crate::error::{AppError, Result};
use crate::models::{generate_id, BookListItem, BookListRecord, BookListResponse, ListType};
use crate::routes::booklists::AddBookRequest;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct FavoriteActionResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct FavoriteStatusResponse {
    #[serde(rename = "isInFavorites")]
    pub is_in_favorites: bool,
}

/// Find the user's reserved favorites list, creating it on first touch
///
/// Opens (and releases) the LISTS and LISTS_BY_USER tables; callers
/// must not hold them when calling this.
fn get_or_create_favorites(
    write_txn: &redb::WriteTransaction,
    user_id: &str,
) -> Result<BookListRecord> {
    let mut lists = write_txn.open_table(tables::LISTS)?;
    let mut by_user = write_txn.open_table(tables::LISTS_BY_USER)?;

    for id in db::read_id_index(&by_user, user_id)? {
        if let Some(bytes) = lists.get(id.as_str())? {
            let list: BookListRecord = db::decode(bytes.value())?;
            if list.list_type == ListType::Favorites {
                return Ok(list);
            }
        }
    }

    // First touch: create the reserved list
    let now = chrono::Utc::now().timestamp();
    let list = BookListRecord {
        id: generate_id(),
        user_id: user_id.to_string(),
        name: "Favorites".to_string(),
        description: Some("My favorite books".to_string()),
        list_type: ListType::Favorites,
        is_public: false,
        is_default: true,
        created_at: now,
        updated_at: now,
        book_count: 0,
        books: Vec::new(),
    };

    let bytes = db::encode(&list)?;
    lists.insert(list.id.as_str(), bytes.as_slice())?;
    db::add_to_id_index(&mut by_user, user_id, &list.id)?;

    tracing::info!("Favorites list created for user {}", user_id);

    Ok(list)
}

/// Fetch the caller's favorites list, creating it on first access
pub async fn get_favorites(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<BookListResponse>> {
    let session_user = require_user(&state, &jar).await?;

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    let list = tokio::task::spawn_blocking(move || -> Result<BookListRecord> {
        let write_txn = db.begin_write()?;
        let list = get_or_create_favorites(&write_txn, &user_id)?;
        write_txn.commit()?;
        Ok(list)
    })
    .await??;

    Ok(Json(BookListResponse::from(&list)))
}

/// Add a book to the caller's favorites
///
/// Adding a book that is already a favorite is reported in the
/// response message rather than as an error.
pub async fn add_favorite(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<AddBookRequest>,
) -> Result<Json<FavoriteActionResponse>> {
    let session_user = require_user(&state, &jar).await?;

    if payload.book_id.trim().is_empty() {
        return Err(AppError::InvalidInput(ERR_EMPTY_BOOK_ID.to_string()));
    }

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    let added = tokio::task::spawn_blocking(move || -> Result<bool> {
        let write_txn = db.begin_write()?;
        let added = {
            let mut list = get_or_create_favorites(&write_txn, &user_id)?;

            if list.contains_book(&payload.book_id) {
                false
            } else {
                let now = chrono::Utc::now().timestamp();
                list.books.push(BookListItem {
                    book_id: payload.book_id.clone(),
                    book_title: payload.book_title.clone(),
                    book_thumbnail: payload.book_thumbnail.clone(),
                    book_authors: payload.book_authors.clone(),
                    added_at: now,
                    notes: payload.notes.clone(),
                    rating: payload.rating,
                    read_date: payload.read_date.clone(),
                    progress: payload.progress,
                });
                list.book_count += 1;
                list.updated_at = now;

                let mut lists = write_txn.open_table(tables::LISTS)?;
                let bytes = db::encode(&list)?;
                lists.insert(list.id.as_str(), bytes.as_slice())?;
                drop(lists);

                db::update_user_stats(&write_txn, &user_id, |stats| {
                    stats.books_favorited += 1;
                })?;
                true
            }
        };
        write_txn.commit()?;
        Ok(added)
    })
    .await??;

    let response = if added {
        FavoriteActionResponse {
            success: true,
            message: "Book added to favorites".to_string(),
        }
    } else {
        FavoriteActionResponse {
            success: false,
            message: "Book is already in your favorites".to_string(),
        }
    };

    Ok(Json(response))
}

/// Remove a book from the caller's favorites
pub async fn remove_favorite(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    jar: CookieJar,
) -> Result<Json<FavoriteActionResponse>> {
    let session_user = require_user(&state, &jar).await?;

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    let removed = tokio::task::spawn_blocking(move || -> Result<bool> {
        let write_txn = db.begin_write()?;
        let removed = {
            let mut list = get_or_create_favorites(&write_txn, &user_id)?;

            if !list.contains_book(&book_id) {
                false
            } else {
                list.books.retain(|b| b.book_id != book_id);
                list.book_count = (list.book_count - 1).max(0);
                list.updated_at = chrono::Utc::now().timestamp();

                let mut lists = write_txn.open_table(tables::LISTS)?;
                let bytes = db::encode(&list)?;
                lists.insert(list.id.as_str(), bytes.as_slice())?;
                drop(lists);

                db::update_user_stats(&write_txn, &user_id, |stats| {
                    stats.books_favorited = (stats.books_favorited - 1).max(0);
                })?;
                true
            }
        };
        write_txn.commit()?;
        Ok(removed)
    })
    .await??;

    let response = if removed {
        FavoriteActionResponse {
            success: true,
            message: "Book removed from favorites".to_string(),
        }
    } else {
        FavoriteActionResponse {
            success: false,
            message: "Book is not in your favorites".to_string(),
        }
    };

    Ok(Json(response))
}

/// Check whether a book is in the caller's favorites
pub async fn favorites_contains(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    jar: CookieJar,
) -> Result<Json<FavoriteStatusResponse>> {
    let session_user = require_user(&state, &jar).await?;

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    let is_in_favorites = tokio::task::spawn_blocking(move || -> Result<bool> {
        let read_txn = db.begin_read()?;
        let lists_table = read_txn.open_table(tables::LISTS)?;
        let by_user = read_txn.open_table(tables::LISTS_BY_USER)?;

        for id in db::read_id_index(&by_user, &user_id)? {
            if let Some(bytes) = lists_table.get(id.as_str())? {
                let list: BookListRecord = db::decode(bytes.value())?;
                if list.list_type == ListType::Favorites && list.contains_book(&book_id) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    })
    .await??;

    Ok(Json(FavoriteStatusResponse { is_in_favorites }))
}
