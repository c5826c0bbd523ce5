pub mod booklist;
pub mod review;
pub mod user;
pub mod vote;

pub use booklist::{BookListItem, BookListRecord, BookListResponse, ListType};
pub use review::{ReviewRecord, ReviewResponse, ReviewStats};
pub use user::{NotificationPrefs, Preferences, PublicUser, UserRecord, UserStats};
pub use vote::{TargetType, VoteRecord, VoteResponse, VoteStats, VoteType};

use chrono::{DateTime, Utc};
use rand::Rng;

/// Convert a stored Unix timestamp to an RFC 3339 string, defaulting to
/// now if the value is out of range
pub fn timestamp_to_rfc3339(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .unwrap_or_else(Utc::now)
        .to_rfc3339()
}

/// Generate an application-level document id: Unix millis plus a short
/// random base36 suffix, e.g. "1733788800123-k3x9q2"
pub fn generate_id() -> String {
    const CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("{}-{}", chrono::Utc::now().timestamp_millis(), suffix)
}
