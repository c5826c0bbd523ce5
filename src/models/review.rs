use serde::{Deserialize, Serialize};

use crate::constants::{MAX_RATING, MAX_REVIEW_CONTENT_CHARS, MIN_RATING};
use crate::models::timestamp_to_rfc3339;

/// Per-review vote counters, denormalized onto the review document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewStats {
    pub likes: i64,
    pub dislikes: i64,
    pub helpful: i64,
    pub reports: i64,
}

/// Review record as stored
///
/// The author's display name and avatar are denormalized to avoid a
/// lookup when listing reviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: String,
    pub book_id: String,
    pub book_title: String,
    pub book_thumbnail: Option<String>,
    pub rating: u8,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub user_id: String,
    pub user_display_name: String,
    pub user_avatar: Option<String>,
    pub is_edited: bool,
    pub is_public: bool,
    pub stats: ReviewStats,
    pub tags: Vec<String>,
    pub spoiler_warning: bool,
}

/// Review projection for API responses
#[derive(Debug, Clone, Serialize)]
pub struct ReviewResponse {
    pub id: String,
    #[serde(rename = "bookId")]
    pub book_id: String,
    #[serde(rename = "bookTitle")]
    pub book_title: String,
    #[serde(rename = "bookThumbnail")]
    pub book_thumbnail: Option<String>,
    pub rating: u8,
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "userDisplayName")]
    pub user_display_name: String,
    #[serde(rename = "userAvatar")]
    pub user_avatar: Option<String>,
    #[serde(rename = "isEdited")]
    pub is_edited: bool,
    #[serde(rename = "isPublic")]
    pub is_public: bool,
    pub stats: ReviewStats,
    pub tags: Vec<String>,
    #[serde(rename = "spoilerWarning")]
    pub spoiler_warning: bool,
}

impl From<&ReviewRecord> for ReviewResponse {
    fn from(review: &ReviewRecord) -> Self {
        Self {
            id: review.id.clone(),
            book_id: review.book_id.clone(),
            book_title: review.book_title.clone(),
            book_thumbnail: review.book_thumbnail.clone(),
            rating: review.rating,
            content: review.content.clone(),
            created_at: timestamp_to_rfc3339(review.created_at),
            updated_at: timestamp_to_rfc3339(review.updated_at),
            user_id: review.user_id.clone(),
            user_display_name: review.user_display_name.clone(),
            user_avatar: review.user_avatar.clone(),
            is_edited: review.is_edited,
            is_public: review.is_public,
            stats: review.stats.clone(),
            tags: review.tags.clone(),
            spoiler_warning: review.spoiler_warning,
        }
    }
}

/// Validate a review rating (1-5 stars)
pub fn validate_rating(rating: u8) -> Result<(), String> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(format!(
            "Rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        ));
    }
    Ok(())
}

/// Validate review content: non-empty after trimming, bounded length
pub fn validate_content(content: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("Review content must not be empty".to_string());
    }
    if content.chars().count() > MAX_REVIEW_CONTENT_CHARS {
        return Err(format!(
            "Review content cannot exceed {} characters",
            MAX_REVIEW_CONTENT_CHARS
        ));
    }
    Ok(())
}
