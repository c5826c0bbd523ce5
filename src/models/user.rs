use serde::{Deserialize, Serialize};

use crate::constants::{
    MAX_DISPLAY_NAME_LEN, MAX_USERNAME_LEN, MIN_DISPLAY_NAME_LEN, MIN_PASSWORD_LEN,
    MIN_USERNAME_LEN,
};
use crate::models::timestamp_to_rfc3339;

/// UI theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    Auto,
}

/// Per-channel notification toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPrefs {
    pub email: bool,
    pub push: bool,
    #[serde(rename = "newReviews")]
    pub new_reviews: bool,
    pub likes: bool,
}

impl Default for NotificationPrefs {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            new_reviews: true,
            likes: true,
        }
    }
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
    pub language: String,
    pub notifications: NotificationPrefs,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            language: "en".to_string(),
            notifications: NotificationPrefs::default(),
        }
    }
}

/// Denormalized per-user aggregate counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(rename = "totalReviews")]
    pub total_reviews: i64,
    #[serde(rename = "totalLikes")]
    pub total_likes: i64,
    #[serde(rename = "totalDislikes")]
    pub total_dislikes: i64,
    #[serde(rename = "booksRead")]
    pub books_read: i64,
    #[serde(rename = "booksFavorited")]
    pub books_favorited: i64,
}

/// User record as stored
///
/// Uses Unix timestamps for compact storage with bincode. The password
/// hash never leaves this record; API responses use [`PublicUser`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    /// Soft-delete flag; deactivated accounts cannot log in
    pub is_active: bool,
    /// Reserved for a future verification flow
    pub email_verified: bool,
    pub last_login: Option<i64>,
    pub preferences: Preferences,
    pub stats: UserStats,
}

/// User projection for API responses
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<&UserRecord> for PublicUser {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            avatar: user.avatar.clone(),
            bio: user.bio.clone(),
            created_at: timestamp_to_rfc3339(user.created_at),
        }
    }
}

/// Validate an email address: one '@' with a dot somewhere after it,
/// no whitespace anywhere
pub fn validate_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.split_once('.').is_some_and(|(host, rest)| {
                    !host.is_empty() && !rest.is_empty() && !domain.contains('@')
                })
        }
        None => false,
    }
}

/// Validate the password policy
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }
    Ok(())
}

/// Validate a username: 3-20 characters from [A-Za-z0-9_-]
pub fn validate_username(username: &str) -> Result<(), String> {
    let len = username.chars().count();
    if len < MIN_USERNAME_LEN {
        return Err(format!(
            "Username must be at least {} characters long",
            MIN_USERNAME_LEN
        ));
    }
    if len > MAX_USERNAME_LEN {
        return Err(format!(
            "Username cannot be longer than {} characters",
            MAX_USERNAME_LEN
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(
            "Username can only contain letters, digits, hyphens and underscores".to_string(),
        );
    }
    Ok(())
}

/// Validate a display name: 2-50 characters
pub fn validate_display_name(display_name: &str) -> Result<(), String> {
    let len = display_name.chars().count();
    if len < MIN_DISPLAY_NAME_LEN {
        return Err(format!(
            "Display name must be at least {} characters long",
            MIN_DISPLAY_NAME_LEN
        ));
    }
    if len > MAX_DISPLAY_NAME_LEN {
        return Err(format!(
            "Display name cannot be longer than {} characters",
            MAX_DISPLAY_NAME_LEN
        ));
    }
    Ok(())
}
