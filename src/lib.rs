//! Books & Reviews Server Library
//!
//! This module exports the core types and functions for testing and reuse.

pub mod auth;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

pub use config::Config;
pub use db::{open_database, Db};
pub use error::{AppError, Result};

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Config,
    /// Shared HTTP client for the chat-completion gateway
    pub http: reqwest::Client,
}

impl AppState {
    /// Create a new AppState with the given database and configuration
    pub fn new(db: Db, config: Config) -> Self {
        Self {
            db,
            config,
            http: reqwest::Client::new(),
        }
    }
}

/// Build the application router
///
/// Shared between the binary and the integration tests so both exercise
/// the same route table.
pub fn app(state: AppState) -> Router {
    use routes::*;

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(register_user))
        .route("/api/auth/login", post(login_user))
        .route("/api/auth/logout", post(logout_user))
        .route("/api/auth/me", get(current_user))
        .route("/api/users", get(list_users))
        .route(
            "/api/users/me",
            patch(update_profile).delete(deactivate_account),
        )
        .route("/api/users/:id", get(get_user))
        .route("/api/reviews", post(create_review).get(list_reviews))
        .route(
            "/api/reviews/:id",
            patch(update_review).delete(delete_review),
        )
        .route("/api/reviews/:id/likes", post(like_review))
        .route("/api/reviews/:id/dislikes", post(dislike_review))
        .route(
            "/api/votes",
            post(cast_vote).get(list_votes).delete(remove_vote),
        )
        .route("/api/votes/stats", get(vote_stats))
        .route("/api/votes/mine", get(my_votes))
        .route("/api/lists", post(create_list).get(my_lists))
        .route("/api/lists/public", get(public_lists))
        .route("/api/lists/contains/:bookId", get(list_containing_book))
        .route(
            "/api/lists/:id",
            get(get_list).patch(update_list).delete(delete_list),
        )
        .route("/api/lists/:id/books", post(add_book_to_list))
        .route(
            "/api/lists/:id/books/:bookId",
            patch(update_book_in_list).delete(remove_book_from_list),
        )
        .route("/api/favorites", get(get_favorites).post(add_favorite))
        .route("/api/favorites/contains/:bookId", get(favorites_contains))
        .route("/api/favorites/:bookId", delete(remove_favorite))
        .route("/api/chat", post(chat_completion))
        .route("/api/admin/stats", get(admin_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
