use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use crate::auth::{claims_from_jar, require_user};
use crate::constants::DEFAULT_VOTE_PAGE_SIZE;
use crate::db::{self, tables};
use crate::error::{AppError, Result};
use crate::models::{generate_id, TargetType, VoteRecord, VoteResponse, VoteStats, VoteType};
use crate::routes::validation::page_window;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    #[serde(rename = "targetType")]
    pub target_type: TargetType,
    #[serde(rename = "targetId")]
    pub target_id: String,
    #[serde(rename = "voteType")]
    pub vote_type: VoteType,
}

#[derive(Debug, Deserialize)]
pub struct VoteTargetParams {
    #[serde(rename = "targetType")]
    pub target_type: TargetType,
    #[serde(rename = "targetId")]
    pub target_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MyVotesParams {
    #[serde(rename = "targetType")]
    pub target_type: Option<TargetType>,
    #[serde(rename = "targetId")]
    pub target_id: Option<String>,
    #[serde(rename = "voteType")]
    pub vote_type: Option<VoteType>,
}

#[derive(Debug, Deserialize)]
pub struct ListVotesParams {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "targetType")]
    pub target_type: Option<TargetType>,
    #[serde(rename = "targetId")]
    pub target_id: Option<String>,
    #[serde(rename = "voteType")]
    pub vote_type: Option<VoteType>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct VoteListResponse {
    pub votes: Vec<VoteResponse>,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct RemoveVoteResponse {
    pub success: bool,
}

/// Cast or change a vote on a target
///
/// A user holds at most one vote per target: re-voting replaces the
/// vote type and reactivates a previously removed vote.
pub async fn cast_vote(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<CastVoteRequest>,
) -> Result<Json<VoteResponse>> {
    let session_user = require_user(&state, &jar).await?;

    if payload.target_id.trim().is_empty() {
        return Err(AppError::InvalidInput("Target ID is required".to_string()));
    }

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    let vote = tokio::task::spawn_blocking(move || -> Result<VoteRecord> {
        let write_txn = db.begin_write()?;
        let vote = {
            let mut votes = write_txn.open_table(tables::VOTES)?;
            let mut vote_keys = write_txn.open_table(tables::VOTE_KEYS)?;
            let mut by_target = write_txn.open_table(tables::VOTES_BY_TARGET)?;

            let key = db::vote_key(
                &user_id,
                payload.target_type.as_str(),
                &payload.target_id,
            );
            let existing_id = vote_keys.get(key.as_str())?.map(|id| id.value().to_string());

            let now = chrono::Utc::now().timestamp();
            let vote = match existing_id {
                // Update the existing vote in place
                Some(vote_id) => {
                    let mut vote: VoteRecord = match votes.get(vote_id.as_str())? {
                        Some(bytes) => db::decode(bytes.value())?,
                        None => return Err(AppError::VoteNotFound),
                    };
                    vote.vote_type = payload.vote_type;
                    vote.updated_at = now;
                    vote.is_active = true;

                    let bytes = db::encode(&vote)?;
                    votes.insert(vote_id.as_str(), bytes.as_slice())?;
                    vote
                }
                // First vote by this user on this target
                None => {
                    let vote = VoteRecord {
                        id: generate_id(),
                        user_id: user_id.clone(),
                        target_type: payload.target_type,
                        target_id: payload.target_id.clone(),
                        vote_type: payload.vote_type,
                        created_at: now,
                        updated_at: now,
                        is_active: true,
                    };

                    let bytes = db::encode(&vote)?;
                    votes.insert(vote.id.as_str(), bytes.as_slice())?;
                    vote_keys.insert(key.as_str(), vote.id.as_str())?;
                    let target = db::target_key(
                        payload.target_type.as_str(),
                        &payload.target_id,
                    );
                    db::add_to_id_index(&mut by_target, &target, &vote.id)?;
                    vote
                }
            };
            vote
        };
        write_txn.commit()?;
        Ok(vote)
    })
    .await??;

    Ok(Json(VoteResponse::from(&vote)))
}

/// Remove the caller's vote on a target (soft delete)
///
/// The record is deactivated rather than deleted so a later re-vote
/// reuses it.
pub async fn remove_vote(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<VoteTargetParams>,
) -> Result<Json<RemoveVoteResponse>> {
    let session_user = require_user(&state, &jar).await?;

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut votes = write_txn.open_table(tables::VOTES)?;
            let vote_keys = write_txn.open_table(tables::VOTE_KEYS)?;

            let key = db::vote_key(&user_id, params.target_type.as_str(), &params.target_id);
            let vote_id = match vote_keys.get(key.as_str())? {
                Some(id) => id.value().to_string(),
                None => return Err(AppError::VoteNotFound),
            };

            let mut vote: VoteRecord = match votes.get(vote_id.as_str())? {
                Some(bytes) => db::decode(bytes.value())?,
                None => return Err(AppError::VoteNotFound),
            };

            vote.is_active = false;
            vote.updated_at = chrono::Utc::now().timestamp();

            let bytes = db::encode(&vote)?;
            votes.insert(vote_id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    Ok(Json(RemoveVoteResponse { success: true }))
}

/// Aggregate vote counts for a target
///
/// Only active votes count. When the request carries a valid session,
/// the response includes the caller's own vote.
pub async fn vote_stats(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<VoteTargetParams>,
) -> Result<Json<VoteStats>> {
    // The caller's vote is best-effort; stats stay available without a session
    let caller_id = claims_from_jar(&jar, &state.config.jwt_secret).map(|claims| claims.sub);

    let db = state.db.clone();
    let stats = tokio::task::spawn_blocking(move || -> Result<VoteStats> {
        let read_txn = db.begin_read()?;
        let votes = read_txn.open_table(tables::VOTES)?;
        let by_target = read_txn.open_table(tables::VOTES_BY_TARGET)?;
        let vote_keys = read_txn.open_table(tables::VOTE_KEYS)?;

        let mut stats = VoteStats::default();

        // Fold every active vote on the target into the counters
        let target = db::target_key(params.target_type.as_str(), &params.target_id);
        for id in db::read_id_index(&by_target, &target)? {
            if let Some(bytes) = votes.get(id.as_str())? {
                let vote: VoteRecord = db::decode(bytes.value())?;
                if vote.is_active {
                    stats.count(vote.vote_type);
                }
            }
        }

        // Attach the caller's own active vote when present
        if let Some(user_id) = caller_id {
            let key = db::vote_key(&user_id, params.target_type.as_str(), &params.target_id);
            if let Some(id) = vote_keys.get(key.as_str())? {
                let vote_id = id.value().to_string();
                if let Some(bytes) = votes.get(vote_id.as_str())? {
                    let vote: VoteRecord = db::decode(bytes.value())?;
                    if vote.is_active {
                        stats.user_vote = Some(vote.vote_type);
                    }
                }
            }
        }

        Ok(stats)
    })
    .await??;

    Ok(Json(stats))
}

/// List the caller's active votes, newest first
pub async fn my_votes(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<MyVotesParams>,
) -> Result<Json<Vec<VoteResponse>>> {
    let session_user = require_user(&state, &jar).await?;

    let db = state.db.clone();
    let user_id = session_user.id.clone();
    let votes = tokio::task::spawn_blocking(move || -> Result<Vec<VoteRecord>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::VOTES)?;

        let mut votes = Vec::new();
        for entry in table.iter()? {
            let (_, bytes) = entry?;
            let vote: VoteRecord = db::decode(bytes.value())?;
            if vote.user_id != user_id || !vote.is_active {
                continue;
            }
            if params.target_type.is_some_and(|t| t != vote.target_type) {
                continue;
            }
            if params.target_id.as_deref().is_some_and(|t| t != vote.target_id) {
                continue;
            }
            if params.vote_type.is_some_and(|t| t != vote.vote_type) {
                continue;
            }
            votes.push(vote);
        }

        votes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(votes)
    })
    .await??;

    Ok(Json(votes.iter().map(VoteResponse::from).collect()))
}

/// List active votes with filters and pagination
pub async fn list_votes(
    State(state): State<AppState>,
    Query(params): Query<ListVotesParams>,
) -> Result<Json<VoteListResponse>> {
    let (skip, take) = page_window(params.page, params.limit, DEFAULT_VOTE_PAGE_SIZE);

    let db = state.db.clone();
    let (votes, total) = tokio::task::spawn_blocking(move || -> Result<(Vec<VoteRecord>, u64)> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::VOTES)?;

        let mut votes = Vec::new();
        for entry in table.iter()? {
            let (_, bytes) = entry?;
            let vote: VoteRecord = db::decode(bytes.value())?;
            if !vote.is_active {
                continue;
            }
            if params.user_id.as_deref().is_some_and(|u| u != vote.user_id) {
                continue;
            }
            if params.target_type.is_some_and(|t| t != vote.target_type) {
                continue;
            }
            if params.target_id.as_deref().is_some_and(|t| t != vote.target_id) {
                continue;
            }
            if params.vote_type.is_some_and(|t| t != vote.vote_type) {
                continue;
            }
            votes.push(vote);
        }

        votes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = votes.len() as u64;
        let votes = votes.into_iter().skip(skip).take(take).collect();
        Ok((votes, total))
    })
    .await??;

    Ok(Json(VoteListResponse {
        votes: votes.iter().map(VoteResponse::from).collect(),
        total,
    }))
}
