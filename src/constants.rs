/// Session cookie name, shared between the issue and clear paths
pub const AUTH_COOKIE: &str = "auth-token";

/// Session token lifetime (7 days), also used as the cookie Max-Age
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Default bcrypt cost when BCRYPT_COST is not set
pub const DEFAULT_BCRYPT_COST: u32 = 12;

// =============================================================================
// Input Policy
// =============================================================================

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Username length bounds
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 20;

/// Display name length bounds
pub const MIN_DISPLAY_NAME_LEN: usize = 2;
pub const MAX_DISPLAY_NAME_LEN: usize = 50;

/// Review rating bounds
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Maximum review content length in characters
/// Typical reviews are a few hundred characters; this is generous headroom
pub const MAX_REVIEW_CONTENT_CHARS: usize = 10_000;

/// Reading progress upper bound (percentage)
pub const MAX_PROGRESS: u8 = 100;

// =============================================================================
// Pagination
// =============================================================================

/// Default page size for vote listings
pub const DEFAULT_VOTE_PAGE_SIZE: u32 = 50;

/// Default page size for user and book-list listings
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Hard cap on any requested page size
pub const MAX_PAGE_SIZE: u32 = 100;

// =============================================================================
// Chat Gateway
// =============================================================================

/// Free models tried in order when no model is configured, and as fallbacks
/// when the selected model returns an empty completion
pub const CHAT_FALLBACK_MODELS: [&str; 4] = [
    "meta-llama/llama-3.1-8b-instruct",
    "microsoft/phi-3-mini-128k-instruct",
    "google/gemini-flash-1.5",
    "meta-llama/llama-3.1-70b-instruct",
];

/// Token budget for the primary completion request
pub const CHAT_MAX_TOKENS: u32 = 1500;

/// Reduced token budget for the fallback completion request
pub const CHAT_FALLBACK_MAX_TOKENS: u32 = 1000;

/// Sampling temperature for chat completions
pub const CHAT_TEMPERATURE: f64 = 0.7;

/// Title header sent to the gateway for request attribution
pub const CHAT_APP_TITLE: &str = "Books and Reviews Chat";

// =============================================================================
// Error Messages
// =============================================================================

/// Error message for update requests that carry no updatable fields
pub const ERR_NOTHING_TO_UPDATE: &str = "No fields to update";

/// Error message for empty book identifiers
pub const ERR_EMPTY_BOOK_ID: &str = "Book ID must not be empty";
