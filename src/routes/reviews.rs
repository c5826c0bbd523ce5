use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use crate::auth::require_user;
use crate::constants::{DEFAULT_PAGE_SIZE, ERR_NOTHING_TO_UPDATE};
use crate::db::{self, tables};
use crate::error::{AppError, Result};
use crate::models::review::{validate_content, validate_rating};
use crate::models::{generate_id, ReviewRecord, ReviewResponse, ReviewStats};
use crate::routes::validation::page_window;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    #[serde(rename = "bookId")]
    pub book_id: String,
    #[serde(rename = "bookTitle")]
    pub book_title: String,
    #[serde(rename = "bookThumbnail")]
    pub book_thumbnail: Option<String>,
    pub rating: u8,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "spoilerWarning", default)]
    pub spoiler_warning: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<u8>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(rename = "spoilerWarning")]
    pub spoiler_warning: Option<bool>,
    #[serde(rename = "isPublic")]
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListReviewsParams {
    #[serde(rename = "bookId")]
    pub book_id: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewResponse>,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct DeleteReviewResponse {
    pub success: bool,
}

/// Create a review for a book
///
/// One review per user per book. The author's display name and avatar
/// are denormalized from the session user, and the author's
/// totalReviews counter is maintained in the same transaction.
pub async fn create_review(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<Json<ReviewResponse>> {
    let session_user = require_user(&state, &jar).await?;

    // 1. Validate input
    if payload.book_id.trim().is_empty() || payload.book_title.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Book ID and title are required".to_string(),
        ));
    }
    validate_rating(payload.rating).map_err(AppError::InvalidInput)?;
    validate_content(&payload.content).map_err(AppError::InvalidInput)?;

    let db = state.db.clone();
    let review = tokio::task::spawn_blocking(move || -> Result<ReviewRecord> {
        let write_txn = db.begin_write()?;
        let review = {
            let mut reviews = write_txn.open_table(tables::REVIEWS)?;
            let mut review_keys = write_txn.open_table(tables::REVIEW_KEYS)?;
            let mut by_book = write_txn.open_table(tables::REVIEWS_BY_BOOK)?;

            // 2. Enforce one review per user per book
            let key = db::review_key(&payload.book_id, &session_user.id);
            if review_keys.get(key.as_str())?.is_some() {
                return Err(AppError::DuplicateReview);
            }

            let now = chrono::Utc::now().timestamp();
            let review = ReviewRecord {
                id: generate_id(),
                book_id: payload.book_id.clone(),
                book_title: payload.book_title.clone(),
                book_thumbnail: payload.book_thumbnail.clone(),
                rating: payload.rating,
                content: payload.content.clone(),
                created_at: now,
                updated_at: now,
                user_id: session_user.id.clone(),
                user_display_name: session_user.display_name.clone(),
                user_avatar: session_user.avatar.clone(),
                is_edited: false,
                is_public: true,
                stats: ReviewStats::default(),
                tags: payload.tags.clone(),
                spoiler_warning: payload.spoiler_warning,
            };

            // 3. Insert the record, the uniqueness key and the book index
            let bytes = db::encode(&review)?;
            reviews.insert(review.id.as_str(), bytes.as_slice())?;
            review_keys.insert(key.as_str(), review.id.as_str())?;
            db::add_to_id_index(&mut by_book, &payload.book_id, &review.id)?;

            drop(reviews);
            drop(review_keys);
            drop(by_book);

            // 4. Maintain the author's aggregate counter
            db::update_user_stats(&write_txn, &session_user.id, |stats| {
                stats.total_reviews += 1;
            })?;

            review
        };
        write_txn.commit()?;
        Ok(review)
    })
    .await??;

    tracing::info!("Review created for book {}", review.book_id);

    Ok(Json(ReviewResponse::from(&review)))
}

/// List reviews, newest first
///
/// Optional bookId and userId filters; the bookId filter goes through
/// the book index instead of a full scan.
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(params): Query<ListReviewsParams>,
) -> Result<Json<ReviewListResponse>> {
    let (skip, take) = page_window(params.page, params.limit, DEFAULT_PAGE_SIZE);

    let db = state.db.clone();
    let (reviews, total) =
        tokio::task::spawn_blocking(move || -> Result<(Vec<ReviewRecord>, u64)> {
            let read_txn = db.begin_read()?;
            let reviews_table = read_txn.open_table(tables::REVIEWS)?;

            let mut reviews = Vec::new();
            if let Some(book_id) = &params.book_id {
                let by_book = read_txn.open_table(tables::REVIEWS_BY_BOOK)?;
                for id in db::read_id_index(&by_book, book_id)? {
                    if let Some(bytes) = reviews_table.get(id.as_str())? {
                        reviews.push(db::decode::<ReviewRecord>(bytes.value())?);
                    }
                }
            } else {
                for entry in reviews_table.iter()? {
                    let (_, bytes) = entry?;
                    reviews.push(db::decode::<ReviewRecord>(bytes.value())?);
                }
            }

            if let Some(user_id) = &params.user_id {
                reviews.retain(|r| &r.user_id == user_id);
            }

            reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            let total = reviews.len() as u64;
            let reviews = reviews.into_iter().skip(skip).take(take).collect();
            Ok((reviews, total))
        })
        .await??;

    Ok(Json(ReviewListResponse {
        reviews: reviews.iter().map(ReviewResponse::from).collect(),
        total,
    }))
}

/// Update a review (owner only)
///
/// Marks the review as edited and bumps updatedAt.
pub async fn update_review(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
    jar: CookieJar,
    Json(payload): Json<UpdateReviewRequest>,
) -> Result<Json<ReviewResponse>> {
    let session_user = require_user(&state, &jar).await?;

    if payload.rating.is_none()
        && payload.content.is_none()
        && payload.tags.is_none()
        && payload.spoiler_warning.is_none()
        && payload.is_public.is_none()
    {
        return Err(AppError::InvalidInput(ERR_NOTHING_TO_UPDATE.to_string()));
    }
    if let Some(rating) = payload.rating {
        validate_rating(rating).map_err(AppError::InvalidInput)?;
    }
    if let Some(content) = &payload.content {
        validate_content(content).map_err(AppError::InvalidInput)?;
    }

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    let review = tokio::task::spawn_blocking(move || -> Result<ReviewRecord> {
        let write_txn = db.begin_write()?;
        let review = {
            let mut reviews = write_txn.open_table(tables::REVIEWS)?;
            let mut review: ReviewRecord = match reviews.get(review_id.as_str())? {
                Some(bytes) => db::decode(bytes.value())?,
                None => return Err(AppError::ReviewNotFound),
            };

            if review.user_id != user_id {
                return Err(AppError::Forbidden);
            }

            if let Some(rating) = payload.rating {
                review.rating = rating;
            }
            if let Some(content) = payload.content {
                review.content = content;
            }
            if let Some(tags) = payload.tags {
                review.tags = tags;
            }
            if let Some(spoiler_warning) = payload.spoiler_warning {
                review.spoiler_warning = spoiler_warning;
            }
            if let Some(is_public) = payload.is_public {
                review.is_public = is_public;
            }
            review.is_edited = true;
            review.updated_at = chrono::Utc::now().timestamp();

            let bytes = db::encode(&review)?;
            reviews.insert(review_id.as_str(), bytes.as_slice())?;
            review
        };
        write_txn.commit()?;
        Ok(review)
    })
    .await??;

    Ok(Json(ReviewResponse::from(&review)))
}

/// Delete a review (owner only)
///
/// Unwinds the uniqueness key and book index and decrements the
/// author's totalReviews counter.
pub async fn delete_review(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
    jar: CookieJar,
) -> Result<Json<DeleteReviewResponse>> {
    let session_user = require_user(&state, &jar).await?;

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut reviews = write_txn.open_table(tables::REVIEWS)?;
            let mut review_keys = write_txn.open_table(tables::REVIEW_KEYS)?;
            let mut by_book = write_txn.open_table(tables::REVIEWS_BY_BOOK)?;

            let review: ReviewRecord = match reviews.get(review_id.as_str())? {
                Some(bytes) => db::decode(bytes.value())?,
                None => return Err(AppError::ReviewNotFound),
            };

            if review.user_id != user_id {
                return Err(AppError::Forbidden);
            }

            reviews.remove(review_id.as_str())?;
            let key = db::review_key(&review.book_id, &review.user_id);
            review_keys.remove(key.as_str())?;
            db::remove_from_id_index(&mut by_book, &review.book_id, &review_id)?;

            drop(reviews);
            drop(review_keys);
            drop(by_book);

            db::update_user_stats(&write_txn, &user_id, |stats| {
                stats.total_reviews = (stats.total_reviews - 1).max(0);
            })?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    tracing::info!("Review deleted by {}", session_user.username);

    Ok(Json(DeleteReviewResponse { success: true }))
}

/// Which review counter an endpoint bumps
enum Counter {
    Likes,
    Dislikes,
}

/// Atomically add one to a review counter and mirror it onto the
/// author's aggregate stats
async fn increment_counter(
    state: AppState,
    review_id: String,
    counter: Counter,
) -> Result<ReviewRecord> {
    let db = state.db.clone();
    let review = tokio::task::spawn_blocking(move || -> Result<ReviewRecord> {
        let write_txn = db.begin_write()?;
        let review = {
            let mut reviews = write_txn.open_table(tables::REVIEWS)?;
            let mut review: ReviewRecord = match reviews.get(review_id.as_str())? {
                Some(bytes) => db::decode(bytes.value())?,
                None => return Err(AppError::ReviewNotFound),
            };

            match counter {
                Counter::Likes => review.stats.likes += 1,
                Counter::Dislikes => review.stats.dislikes += 1,
            }

            let bytes = db::encode(&review)?;
            reviews.insert(review_id.as_str(), bytes.as_slice())?;
            drop(reviews);

            db::update_user_stats(&write_txn, &review.user_id, |stats| match counter {
                Counter::Likes => stats.total_likes += 1,
                Counter::Dislikes => stats.total_dislikes += 1,
            })?;

            review
        };
        write_txn.commit()?;
        Ok(review)
    })
    .await??;

    Ok(review)
}

/// Increment a review's like counter
pub async fn like_review(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
) -> Result<Json<ReviewResponse>> {
    let review = increment_counter(state, review_id, Counter::Likes).await?;
    Ok(Json(ReviewResponse::from(&review)))
}

/// Increment a review's dislike counter
pub async fn dislike_review(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
) -> Result<Json<ReviewResponse>> {
    let review = increment_counter(state, review_id, Counter::Dislikes).await?;
    Ok(Json(ReviewResponse::from(&review)))
}
