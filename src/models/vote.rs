use serde::{Deserialize, Serialize};

use crate::models::timestamp_to_rfc3339;

/// Kind of vote a user can cast on a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Like,
    Dislike,
    Helpful,
    Report,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Like => "like",
            VoteType::Dislike => "dislike",
            VoteType::Helpful => "helpful",
            VoteType::Report => "report",
        }
    }
}

/// Kind of content a vote targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Review,
    Comment,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Review => "review",
            TargetType::Comment => "comment",
        }
    }
}

/// Vote record as stored
///
/// Votes are soft-deleted: removing a vote flips `is_active` so the
/// unique (user, target) key survives for later re-votes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRecord {
    pub id: String,
    pub user_id: String,
    pub target_type: TargetType,
    pub target_id: String,
    pub vote_type: VoteType,
    pub created_at: i64,
    pub updated_at: i64,
    pub is_active: bool,
}

/// Vote projection for API responses
#[derive(Debug, Clone, Serialize)]
pub struct VoteResponse {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "targetType")]
    pub target_type: TargetType,
    #[serde(rename = "targetId")]
    pub target_id: String,
    #[serde(rename = "voteType")]
    pub vote_type: VoteType,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

impl From<&VoteRecord> for VoteResponse {
    fn from(vote: &VoteRecord) -> Self {
        Self {
            id: vote.id.clone(),
            user_id: vote.user_id.clone(),
            target_type: vote.target_type,
            target_id: vote.target_id.clone(),
            vote_type: vote.vote_type,
            created_at: timestamp_to_rfc3339(vote.created_at),
            updated_at: timestamp_to_rfc3339(vote.updated_at),
            is_active: vote.is_active,
        }
    }
}

/// Aggregated vote counts for one target
#[derive(Debug, Clone, Default, Serialize)]
pub struct VoteStats {
    pub likes: i64,
    pub dislikes: i64,
    pub helpful: i64,
    pub reports: i64,
    /// The calling user's own active vote, when a session is present
    #[serde(rename = "userVote", skip_serializing_if = "Option::is_none")]
    pub user_vote: Option<VoteType>,
}

impl VoteStats {
    /// Fold one active vote into the counters
    pub fn count(&mut self, vote_type: VoteType) {
        match vote_type {
            VoteType::Like => self.likes += 1,
            VoteType::Dislike => self.dislikes += 1,
            VoteType::Helpful => self.helpful += 1,
            VoteType::Report => self.reports += 1,
        }
    }
}
