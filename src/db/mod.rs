pub mod tables;

use redb::{Database, Error as RedbError, ReadableTable};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{UserRecord, UserStats};

/// Database handle type (Arc-wrapped for sharing across handlers)
pub type Db = Arc<Database>;

/// Bincode configuration shared by every record encode/decode
pub const BINCODE_CONFIG: bincode::config::Configuration = bincode::config::standard();

/// Open or create the redb database at the given path
///
/// Creates all collection and index tables on first run.
#[allow(clippy::result_large_err)]
pub fn open_database(path: impl AsRef<Path>) -> std::result::Result<Db, RedbError> {
    tracing::info!("Opening database at: {:?}", path.as_ref());

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.as_ref().parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                tracing::error!("Failed to create database directory: {}", e);
                RedbError::Io(e)
            })?;
        }
    }

    let db = Database::create(path)?;

    // Initialize tables on first run
    let write_txn = db.begin_write()?;
    {
        // Create tables if they don't exist by opening them
        let _ = write_txn.open_table(tables::USERS)?;
        let _ = write_txn.open_table(tables::USERS_BY_EMAIL)?;
        let _ = write_txn.open_table(tables::USERS_BY_USERNAME)?;
        let _ = write_txn.open_table(tables::REVIEWS)?;
        let _ = write_txn.open_table(tables::REVIEW_KEYS)?;
        let _ = write_txn.open_table(tables::REVIEWS_BY_BOOK)?;
        let _ = write_txn.open_table(tables::VOTES)?;
        let _ = write_txn.open_table(tables::VOTE_KEYS)?;
        let _ = write_txn.open_table(tables::VOTES_BY_TARGET)?;
        let _ = write_txn.open_table(tables::LISTS)?;
        let _ = write_txn.open_table(tables::LISTS_BY_USER)?;
    }
    write_txn.commit()?;

    tracing::info!("Database initialized successfully");

    Ok(Arc::new(db))
}

/// Serialize a record for storage
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serde::encode_to_vec(value, BINCODE_CONFIG)?)
}

/// Deserialize a stored record
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let (value, _) = bincode::serde::decode_from_slice(bytes, BINCODE_CONFIG)?;
    Ok(value)
}

/// Read an id list from an index table, empty when the key is absent
pub fn read_id_index<T>(table: &T, key: &str) -> Result<Vec<String>>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    Ok(match table.get(key)? {
        Some(bytes) => decode(bytes.value())?,
        None => Vec::new(),
    })
}

/// Add an id to an index table entry, creating the entry if needed
pub fn add_to_id_index(
    table: &mut redb::Table<'_, &'static str, &'static [u8]>,
    key: &str,
    id: &str,
) -> Result<()> {
    let mut ids = read_id_index(table, key)?;
    if !ids.iter().any(|existing| existing == id) {
        ids.push(id.to_string());
        let bytes = encode(&ids)?;
        table.insert(key, bytes.as_slice())?;
    }
    Ok(())
}

/// Remove an id from an index table entry, dropping the entry when it empties
pub fn remove_from_id_index(
    table: &mut redb::Table<'_, &'static str, &'static [u8]>,
    key: &str,
    id: &str,
) -> Result<()> {
    let mut ids = read_id_index(table, key)?;
    let before = ids.len();
    ids.retain(|existing| existing != id);
    if ids.len() == before {
        return Ok(());
    }
    if ids.is_empty() {
        table.remove(key)?;
    } else {
        let bytes = encode(&ids)?;
        table.insert(key, bytes.as_slice())?;
    }
    Ok(())
}

/// Apply a mutation to a user's aggregate stats inside the caller's transaction
///
/// Foreign-key references are denormalized strings without integrity
/// enforcement, so a missing user is a no-op rather than an error.
/// The caller must not hold the USERS table open.
pub fn update_user_stats(
    write_txn: &redb::WriteTransaction,
    user_id: &str,
    apply: impl FnOnce(&mut UserStats),
) -> Result<()> {
    let mut users = write_txn.open_table(tables::USERS)?;
    let existing = match users.get(user_id)? {
        Some(bytes) => Some(decode::<UserRecord>(bytes.value())?),
        None => None,
    };
    if let Some(mut user) = existing {
        apply(&mut user.stats);
        let bytes = encode(&user)?;
        users.insert(user_id, bytes.as_slice())?;
    }
    Ok(())
}

/// Compound key for the review uniqueness index
pub fn review_key(book_id: &str, user_id: &str) -> String {
    format!("{}|{}", book_id, user_id)
}

/// Compound key for the vote uniqueness index
pub fn vote_key(user_id: &str, target_type: &str, target_id: &str) -> String {
    format!("{}|{}|{}", user_id, target_type, target_id)
}

/// Compound key for the vote target index
pub fn target_key(target_type: &str, target_id: &str) -> String {
    format!("{}|{}", target_type, target_id)
}
