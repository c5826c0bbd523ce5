use redb::TableDefinition;

/// Users collection: id -> UserRecord (serialized)
pub const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Unique email index: email -> user id
pub const USERS_BY_EMAIL: TableDefinition<&str, &str> = TableDefinition::new("users_by_email");

/// Unique username index: username -> user id
pub const USERS_BY_USERNAME: TableDefinition<&str, &str> =
    TableDefinition::new("users_by_username");

/// Reviews collection: id -> ReviewRecord (serialized)
pub const REVIEWS: TableDefinition<&str, &[u8]> = TableDefinition::new("reviews");

/// Unique review key: "{book_id}|{user_id}" -> review id
/// A user can review a book at most once
pub const REVIEW_KEYS: TableDefinition<&str, &str> = TableDefinition::new("review_keys");

/// Book lookup index: book_id -> Vec<review id>
pub const REVIEWS_BY_BOOK: TableDefinition<&str, &[u8]> = TableDefinition::new("reviews_by_book");

/// Votes collection: id -> VoteRecord (serialized)
pub const VOTES: TableDefinition<&str, &[u8]> = TableDefinition::new("votes");

/// Unique vote key: "{user_id}|{target_type}|{target_id}" -> vote id
/// A user can hold at most one vote per target; re-voting updates it
pub const VOTE_KEYS: TableDefinition<&str, &str> = TableDefinition::new("vote_keys");

/// Target lookup index: "{target_type}|{target_id}" -> Vec<vote id>
/// Used to aggregate vote stats for a review or comment
pub const VOTES_BY_TARGET: TableDefinition<&str, &[u8]> = TableDefinition::new("votes_by_target");

/// Book lists collection: id -> BookListRecord (serialized)
pub const LISTS: TableDefinition<&str, &[u8]> = TableDefinition::new("lists");

/// Owner lookup index: user_id -> Vec<list id>
pub const LISTS_BY_USER: TableDefinition<&str, &[u8]> = TableDefinition::new("lists_by_user");
