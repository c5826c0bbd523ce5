use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use crate::auth::{claims_from_jar, require_user};
use crate::constants::{DEFAULT_PAGE_SIZE, ERR_EMPTY_BOOK_ID, ERR_NOTHING_TO_UPDATE};
use crate::db::{self, tables};
use crate::error::{AppError, Result};
use crate::models::booklist::validate_progress;
use crate::models::review::validate_rating;
use crate::models::{
    generate_id, BookListItem, BookListRecord, BookListResponse, ListType,
};
use crate::routes::validation::page_window;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub list_type: ListType,
    #[serde(rename = "isPublic", default)]
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateListRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "isPublic")]
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AddBookRequest {
    #[serde(rename = "bookId")]
    pub book_id: String,
    #[serde(rename = "bookTitle")]
    pub book_title: String,
    #[serde(rename = "bookThumbnail")]
    pub book_thumbnail: Option<String>,
    #[serde(rename = "bookAuthors", default)]
    pub book_authors: Vec<String>,
    pub notes: Option<String>,
    pub rating: Option<u8>,
    #[serde(rename = "readDate")]
    pub read_date: Option<String>,
    pub progress: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookRequest {
    pub notes: Option<String>,
    pub rating: Option<u8>,
    #[serde(rename = "readDate")]
    pub read_date: Option<String>,
    pub progress: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct MyListsParams {
    #[serde(rename = "type")]
    pub list_type: Option<ListType>,
}

#[derive(Debug, Deserialize)]
pub struct PublicListsParams {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub list_type: Option<ListType>,
    #[serde(rename = "bookId")]
    pub book_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ContainsParams {
    #[serde(rename = "type")]
    pub list_type: Option<ListType>,
}

#[derive(Debug, Serialize)]
pub struct ListListResponse {
    pub lists: Vec<BookListResponse>,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct ContainsResponse {
    #[serde(rename = "isInList")]
    pub is_in_list: bool,
    #[serde(rename = "listId", skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteListResponse {
    pub success: bool,
}

/// Validate the optional per-book fields shared by add and update
fn validate_book_fields(rating: Option<u8>, progress: Option<u8>) -> Result<()> {
    if let Some(rating) = rating {
        validate_rating(rating).map_err(AppError::InvalidInput)?;
    }
    if let Some(progress) = progress {
        validate_progress(progress).map_err(AppError::InvalidInput)?;
    }
    Ok(())
}

/// Create a book list
pub async fn create_list(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<CreateListRequest>,
) -> Result<Json<BookListResponse>> {
    let session_user = require_user(&state, &jar).await?;

    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput("List name is required".to_string()));
    }

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    let list = tokio::task::spawn_blocking(move || -> Result<BookListRecord> {
        let now = chrono::Utc::now().timestamp();
        let list = BookListRecord {
            id: generate_id(),
            user_id: user_id.clone(),
            name: payload.name.clone(),
            description: payload.description.clone(),
            list_type: payload.list_type,
            is_public: payload.is_public,
            is_default: false,
            created_at: now,
            updated_at: now,
            book_count: 0,
            books: Vec::new(),
        };

        let write_txn = db.begin_write()?;
        {
            let mut lists = write_txn.open_table(tables::LISTS)?;
            let mut by_user = write_txn.open_table(tables::LISTS_BY_USER)?;

            let bytes = db::encode(&list)?;
            lists.insert(list.id.as_str(), bytes.as_slice())?;
            db::add_to_id_index(&mut by_user, &user_id, &list.id)?;
        }
        write_txn.commit()?;
        Ok(list)
    })
    .await??;

    tracing::info!("List created: {}", list.name);

    Ok(Json(BookListResponse::from(&list)))
}

/// List the caller's book lists, newest first
pub async fn my_lists(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<MyListsParams>,
) -> Result<Json<Vec<BookListResponse>>> {
    let session_user = require_user(&state, &jar).await?;

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    let lists = tokio::task::spawn_blocking(move || -> Result<Vec<BookListRecord>> {
        let read_txn = db.begin_read()?;
        let lists_table = read_txn.open_table(tables::LISTS)?;
        let by_user = read_txn.open_table(tables::LISTS_BY_USER)?;

        let mut lists = Vec::new();
        for id in db::read_id_index(&by_user, &user_id)? {
            if let Some(bytes) = lists_table.get(id.as_str())? {
                let list: BookListRecord = db::decode(bytes.value())?;
                if params.list_type.is_some_and(|t| t != list.list_type) {
                    continue;
                }
                lists.push(list);
            }
        }

        lists.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(lists)
    })
    .await??;

    Ok(Json(lists.iter().map(BookListResponse::from).collect()))
}

/// List public book lists, most recently updated first
pub async fn public_lists(
    State(state): State<AppState>,
    Query(params): Query<PublicListsParams>,
) -> Result<Json<ListListResponse>> {
    let (skip, take) = page_window(params.page, params.limit, DEFAULT_PAGE_SIZE);

    let db = state.db.clone();
    let (lists, total) =
        tokio::task::spawn_blocking(move || -> Result<(Vec<BookListRecord>, u64)> {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(tables::LISTS)?;

            let mut lists = Vec::new();
            for entry in table.iter()? {
                let (_, bytes) = entry?;
                let list: BookListRecord = db::decode(bytes.value())?;
                if !list.is_public {
                    continue;
                }
                if params.user_id.as_deref().is_some_and(|u| u != list.user_id) {
                    continue;
                }
                if params.list_type.is_some_and(|t| t != list.list_type) {
                    continue;
                }
                if params
                    .book_id
                    .as_deref()
                    .is_some_and(|b| !list.contains_book(b))
                {
                    continue;
                }
                lists.push(list);
            }

            lists.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
            let total = lists.len() as u64;
            let lists = lists.into_iter().skip(skip).take(take).collect();
            Ok((lists, total))
        })
        .await??;

    Ok(Json(ListListResponse {
        lists: lists.iter().map(BookListResponse::from).collect(),
        total,
    }))
}

/// Fetch one list by id
///
/// Public lists are visible to anyone; private lists only to their owner.
pub async fn get_list(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    jar: CookieJar,
) -> Result<Json<BookListResponse>> {
    let caller_id = claims_from_jar(&jar, &state.config.jwt_secret).map(|claims| claims.sub);

    let db = state.db.clone();
    let list = tokio::task::spawn_blocking(move || -> Result<BookListRecord> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::LISTS)?;

        let list: BookListRecord = match table.get(list_id.as_str())? {
            Some(bytes) => db::decode(bytes.value())?,
            None => return Err(AppError::ListNotFound),
        };

        // Private lists are indistinguishable from missing ones
        if !list.is_public && caller_id.as_deref() != Some(list.user_id.as_str()) {
            return Err(AppError::ListNotFound);
        }

        Ok(list)
    })
    .await??;

    Ok(Json(BookListResponse::from(&list)))
}

/// Update a list's metadata (owner only)
pub async fn update_list(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    jar: CookieJar,
    Json(payload): Json<UpdateListRequest>,
) -> Result<Json<BookListResponse>> {
    let session_user = require_user(&state, &jar).await?;

    if payload.name.is_none() && payload.description.is_none() && payload.is_public.is_none() {
        return Err(AppError::InvalidInput(ERR_NOTHING_TO_UPDATE.to_string()));
    }
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(AppError::InvalidInput("List name is required".to_string()));
        }
    }

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    let list = tokio::task::spawn_blocking(move || -> Result<BookListRecord> {
        let write_txn = db.begin_write()?;
        let list = {
            let mut lists = write_txn.open_table(tables::LISTS)?;
            let mut list: BookListRecord = match lists.get(list_id.as_str())? {
                Some(bytes) => db::decode(bytes.value())?,
                None => return Err(AppError::ListNotFound),
            };

            if list.user_id != user_id {
                return Err(AppError::Forbidden);
            }

            if let Some(name) = payload.name {
                list.name = name;
            }
            if let Some(description) = payload.description {
                list.description = Some(description);
            }
            if let Some(is_public) = payload.is_public {
                list.is_public = is_public;
            }
            list.updated_at = chrono::Utc::now().timestamp();

            let bytes = db::encode(&list)?;
            lists.insert(list_id.as_str(), bytes.as_slice())?;
            list
        };
        write_txn.commit()?;
        Ok(list)
    })
    .await??;

    Ok(Json(BookListResponse::from(&list)))
}

/// Delete a list (owner only)
pub async fn delete_list(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    jar: CookieJar,
) -> Result<Json<DeleteListResponse>> {
    let session_user = require_user(&state, &jar).await?;

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut lists = write_txn.open_table(tables::LISTS)?;
            let mut by_user = write_txn.open_table(tables::LISTS_BY_USER)?;

            let list: BookListRecord = match lists.get(list_id.as_str())? {
                Some(bytes) => db::decode(bytes.value())?,
                None => return Err(AppError::ListNotFound),
            };

            if list.user_id != user_id {
                return Err(AppError::Forbidden);
            }

            lists.remove(list_id.as_str())?;
            db::remove_from_id_index(&mut by_user, &user_id, &list_id)?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    Ok(Json(DeleteListResponse { success: true }))
}

/// Add a book to a list (owner only)
///
/// The entry push, the bookCount increment and the updatedAt bump land
/// in one atomic document update. Duplicate books are rejected so the
/// count always equals the entry count.
pub async fn add_book_to_list(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    jar: CookieJar,
    Json(payload): Json<AddBookRequest>,
) -> Result<Json<BookListResponse>> {
    let session_user = require_user(&state, &jar).await?;

    if payload.book_id.trim().is_empty() {
        return Err(AppError::InvalidInput(ERR_EMPTY_BOOK_ID.to_string()));
    }
    validate_book_fields(payload.rating, payload.progress)?;

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    let list = tokio::task::spawn_blocking(move || -> Result<BookListRecord> {
        let write_txn = db.begin_write()?;
        let list = {
            let mut lists = write_txn.open_table(tables::LISTS)?;
            let mut list: BookListRecord = match lists.get(list_id.as_str())? {
                Some(bytes) => db::decode(bytes.value())?,
                None => return Err(AppError::ListNotFound),
            };

            if list.user_id != user_id {
                return Err(AppError::Forbidden);
            }
            if list.contains_book(&payload.book_id) {
                return Err(AppError::BookAlreadyInList);
            }

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

            let bytes = db::encode(&list)?;
            lists.insert(list_id.as_str(), bytes.as_slice())?;
            drop(lists);

            // Books added to a "read" list count toward booksRead
            if list.list_type == ListType::Read {
                db::update_user_stats(&write_txn, &user_id, |stats| {
                    stats.books_read += 1;
                })?;
            }

            list
        };
        write_txn.commit()?;
        Ok(list)
    })
    .await??;

    Ok(Json(BookListResponse::from(&list)))
}

/// Update one book entry in a list (owner only)
pub async fn update_book_in_list(
    State(state): State<AppState>,
    Path((list_id, book_id)): Path<(String, String)>,
    jar: CookieJar,
    Json(payload): Json<UpdateBookRequest>,
) -> Result<Json<BookListResponse>> {
    let session_user = require_user(&state, &jar).await?;

    if payload.notes.is_none()
        && payload.rating.is_none()
        && payload.read_date.is_none()
        && payload.progress.is_none()
    {
        return Err(AppError::InvalidInput(ERR_NOTHING_TO_UPDATE.to_string()));
    }
    validate_book_fields(payload.rating, payload.progress)?;

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    let list = tokio::task::spawn_blocking(move || -> Result<BookListRecord> {
        let write_txn = db.begin_write()?;
        let list = {
            let mut lists = write_txn.open_table(tables::LISTS)?;
            let mut list: BookListRecord = match lists.get(list_id.as_str())? {
                Some(bytes) => db::decode(bytes.value())?,
                None => return Err(AppError::ListNotFound),
            };

            if list.user_id != user_id {
                return Err(AppError::Forbidden);
            }

            let entry = match list.books.iter_mut().find(|b| b.book_id == book_id) {
                Some(entry) => entry,
                None => return Err(AppError::BookNotInList),
            };

            if let Some(notes) = payload.notes {
                entry.notes = Some(notes);
            }
            if let Some(rating) = payload.rating {
                entry.rating = Some(rating);
            }
            if let Some(read_date) = payload.read_date {
                entry.read_date = Some(read_date);
            }
            if let Some(progress) = payload.progress {
                entry.progress = Some(progress);
            }
            list.updated_at = chrono::Utc::now().timestamp();

            let bytes = db::encode(&list)?;
            lists.insert(list_id.as_str(), bytes.as_slice())?;
            list
        };
        write_txn.commit()?;
        Ok(list)
    })
    .await??;

    Ok(Json(BookListResponse::from(&list)))
}

/// Remove a book from a list (owner only)
pub async fn remove_book_from_list(
    State(state): State<AppState>,
    Path((list_id, book_id)): Path<(String, String)>,
    jar: CookieJar,
) -> Result<Json<BookListResponse>> {
    let session_user = require_user(&state, &jar).await?;

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    let list = tokio::task::spawn_blocking(move || -> Result<BookListRecord> {
        let write_txn = db.begin_write()?;
        let list = {
            let mut lists = write_txn.open_table(tables::LISTS)?;
            let mut list: BookListRecord = match lists.get(list_id.as_str())? {
                Some(bytes) => db::decode(bytes.value())?,
                None => return Err(AppError::ListNotFound),
            };

            if list.user_id != user_id {
                return Err(AppError::Forbidden);
            }
            if !list.contains_book(&book_id) {
                return Err(AppError::BookNotInList);
            }

            list.books.retain(|b| b.book_id != book_id);
            list.book_count = (list.book_count - 1).max(0);
            list.updated_at = chrono::Utc::now().timestamp();

            let bytes = db::encode(&list)?;
            lists.insert(list_id.as_str(), bytes.as_slice())?;
            drop(lists);

            if list.list_type == ListType::Read {
                db::update_user_stats(&write_txn, &user_id, |stats| {
                    stats.books_read = (stats.books_read - 1).max(0);
                })?;
            }

            list
        };
        write_txn.commit()?;
        Ok(list)
    })
    .await??;

    Ok(Json(BookListResponse::from(&list)))
}

/// Check whether one of the caller's lists contains a book
///
/// An optional type parameter narrows the check to one list kind.
pub async fn list_containing_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    jar: CookieJar,
    Query(params): Query<ContainsParams>,
) -> Result<Json<ContainsResponse>> {
    let session_user = require_user(&state, &jar).await?;

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    let list_id = tokio::task::spawn_blocking(move || -> Result<Option<String>> {
        let read_txn = db.begin_read()?;
        let lists_table = read_txn.open_table(tables::LISTS)?;
        let by_user = read_txn.open_table(tables::LISTS_BY_USER)?;

        for id in db::read_id_index(&by_user, &user_id)? {
            if let Some(bytes) = lists_table.get(id.as_str())? {
                let list: BookListRecord = db::decode(bytes.value())?;
                if params.list_type.is_some_and(|t| t != list.list_type) {
                    continue;
                }
                if list.contains_book(&book_id) {
                    return Ok(Some(list.id));
                }
            }
        }
        Ok(None)
    })
    .await??;

    Ok(Json(ContainsResponse {
        is_in_list: list_id.is_some(),
        list_id,
    }))
}
