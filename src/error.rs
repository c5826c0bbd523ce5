use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::error::EncodeError),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bincode::error::DecodeError),

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Upstream request error: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Email or username already in use")]
    EmailOrUsernameTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is deactivated")]
    AccountDisabled,

    #[error("Authentication required")]
    Unauthorized,

    #[error("You do not own this resource")]
    Forbidden,

    #[error("User not found")]
    UserNotFound,

    #[error("Review not found")]
    ReviewNotFound,

    #[error("You have already reviewed this book")]
    DuplicateReview,

    #[error("Vote not found")]
    VoteNotFound,

    #[error("List not found")]
    ListNotFound,

    #[error("Book is already in the list")]
    BookAlreadyInList,

    #[error("Book is not in the list")]
    BookNotInList,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Chat service unavailable")]
    ChatUnavailable,
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Transaction(ref e) => {
                tracing::error!("Transaction error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Table(ref e) => {
                tracing::error!("Table error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Storage(ref e) => {
                tracing::error!("Storage error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Commit(ref e) => {
                tracing::error!("Commit error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Serialization(ref e) => {
                tracing::error!("Serialization error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Deserialization(ref e) => {
                tracing::error!("Deserialization error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::TaskJoin(ref e) => {
                tracing::error!("Task join error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::PasswordHash(ref e) => {
                tracing::error!("Password hashing error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Token(ref e) => {
                tracing::error!("Token error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Upstream(ref e) => {
                tracing::error!("Upstream request error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::EmailOrUsernameTaken => {
                (StatusCode::CONFLICT, "Email or username already in use")
            }
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            AppError::AccountDisabled => (StatusCode::FORBIDDEN, "Account is deactivated"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "You do not own this resource"),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
            AppError::ReviewNotFound => (StatusCode::NOT_FOUND, "Review not found"),
            AppError::DuplicateReview => {
                (StatusCode::CONFLICT, "You have already reviewed this book")
            }
            AppError::VoteNotFound => (StatusCode::NOT_FOUND, "Vote not found"),
            AppError::ListNotFound => (StatusCode::NOT_FOUND, "List not found"),
            AppError::BookAlreadyInList => (StatusCode::CONFLICT, "Book is already in the list"),
            AppError::BookNotInList => (StatusCode::NOT_FOUND, "Book is not in the list"),
            AppError::InvalidInput(ref msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::ChatUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Chat service temporarily unavailable - please try again later",
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;
