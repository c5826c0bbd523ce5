use serde::{Deserialize, Serialize};

use crate::constants::MAX_PROGRESS;
use crate::models::timestamp_to_rfc3339;

/// Book list categories; `Favorites` is the reserved per-user default list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListType {
    Favorites,
    WantToRead,
    CurrentlyReading,
    Read,
    Custom,
}

/// One book entry embedded in a list document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookListItem {
    pub book_id: String,
    pub book_title: String,
    pub book_thumbnail: Option<String>,
    pub book_authors: Vec<String>,
    pub added_at: i64,
    pub notes: Option<String>,
    pub rating: Option<u8>,
    pub read_date: Option<String>,
    /// Reading progress percentage (0-100)
    pub progress: Option<u8>,
}

/// Book list record as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookListRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub list_type: ListType,
    pub is_public: bool,
    /// System-created lists (the favorites list) carry this flag
    pub is_default: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub book_count: i64,
    pub books: Vec<BookListItem>,
}

impl BookListRecord {
    /// Whether the list already contains a book
    pub fn contains_book(&self, book_id: &str) -> bool {
        self.books.iter().any(|b| b.book_id == book_id)
    }
}

/// Book entry projection for API responses
#[derive(Debug, Clone, Serialize)]
pub struct BookListItemResponse {
    #[serde(rename = "bookId")]
    pub book_id: String,
    #[serde(rename = "bookTitle")]
    pub book_title: String,
    #[serde(rename = "bookThumbnail")]
    pub book_thumbnail: Option<String>,
    #[serde(rename = "bookAuthors")]
    pub book_authors: Vec<String>,
    #[serde(rename = "addedAt")]
    pub added_at: String,
    pub notes: Option<String>,
    pub rating: Option<u8>,
    #[serde(rename = "readDate")]
    pub read_date: Option<String>,
    pub progress: Option<u8>,
}

/// Book list projection for API responses
#[derive(Debug, Clone, Serialize)]
pub struct BookListResponse {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub list_type: ListType,
    #[serde(rename = "isPublic")]
    pub is_public: bool,
    #[serde(rename = "isDefault")]
    pub is_default: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    #[serde(rename = "bookCount")]
    pub book_count: i64,
    pub books: Vec<BookListItemResponse>,
}

impl From<&BookListRecord> for BookListResponse {
    fn from(list: &BookListRecord) -> Self {
        Self {
            id: list.id.clone(),
            user_id: list.user_id.clone(),
            name: list.name.clone(),
            description: list.description.clone(),
            list_type: list.list_type,
            is_public: list.is_public,
            is_default: list.is_default,
            created_at: timestamp_to_rfc3339(list.created_at),
            updated_at: timestamp_to_rfc3339(list.updated_at),
            book_count: list.book_count,
            books: list
                .books
                .iter()
                .map(|b| BookListItemResponse {
                    book_id: b.book_id.clone(),
                    book_title: b.book_title.clone(),
                    book_thumbnail: b.book_thumbnail.clone(),
                    book_authors: b.book_authors.clone(),
                    added_at: timestamp_to_rfc3339(b.added_at),
                    notes: b.notes.clone(),
                    rating: b.rating,
                    read_date: b.read_date.clone(),
                    progress: b.progress,
                })
                .collect(),
        }
    }
}

/// Validate a reading progress percentage
pub fn validate_progress(progress: u8) -> Result<(), String> {
    if progress > MAX_PROGRESS {
        return Err(format!("Progress must be between 0 and {}", MAX_PROGRESS));
    }
    Ok(())
}
