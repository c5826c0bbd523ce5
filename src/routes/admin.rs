use axum::{
    extract::{Query, State},
    Json,
};
use redb::ReadableTableMetadata;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::db::tables;
use crate::error::{AppError, Result};
use crate::AppState;

/// Query parameters for admin stats endpoint
#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    /// Admin secret key for authentication
    pub key: String,
}

/// Database statistics response
#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    pub user_count: u64,
    pub review_count: u64,
    pub vote_count: u64,
    pub list_count: u64,
    pub total_records: u64,
    pub database_size_bytes: u64,
    pub database_size_human: String,
}

/// Format bytes into human-readable string
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Admin stats endpoint
///
/// Returns per-collection record counts for monitoring and diagnostics.
/// Requires the admin secret key passed as a query parameter; disabled
/// entirely when ADMIN_SECRET_KEY is unset.
///
/// GET /api/admin/stats?key=<admin_secret_key>
pub async fn admin_stats(
    State(state): State<AppState>,
    Query(params): Query<AdminQuery>,
) -> Result<Json<AdminStatsResponse>> {
    // Check if admin endpoints are enabled
    let admin_key = state
        .config
        .admin_secret_key
        .as_ref()
        .ok_or(AppError::Unauthorized)?;

    // Verify the provided key matches
    if params.key != *admin_key {
        tracing::warn!("Invalid admin key attempt");
        return Err(AppError::Unauthorized);
    }

    // Get database file size
    let db_path = state.config.database_path.clone();
    let database_size_bytes = fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    // Count records per collection
    let db = state.db.clone();
    let (user_count, review_count, vote_count, list_count) =
        tokio::task::spawn_blocking(move || -> Result<(u64, u64, u64, u64)> {
            let read_txn = db.begin_read()?;

            let user_count = read_txn.open_table(tables::USERS)?.len()?;
            let review_count = read_txn.open_table(tables::REVIEWS)?.len()?;
            let vote_count = read_txn.open_table(tables::VOTES)?.len()?;
            let list_count = read_txn.open_table(tables::LISTS)?.len()?;

            Ok((user_count, review_count, vote_count, list_count))
        })
        .await??;

    let total_records = user_count + review_count + vote_count + list_count;

    tracing::info!(
        "Admin stats requested: {} users, {} reviews, {} votes, {} lists, {} database",
        user_count,
        review_count,
        vote_count,
        list_count,
        format_bytes(database_size_bytes)
    );

    Ok(Json(AdminStatsResponse {
        user_count,
        review_count,
        vote_count,
        list_count,
        total_records,
        database_size_bytes,
        database_size_human: format_bytes(database_size_bytes),
    }))
}
