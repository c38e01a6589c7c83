use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - a portal account that can author posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub password_hash: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new active user with generated ID and timestamps.
    /// Emails are stored lowercased so lookups stay case-insensitive.
    pub fn new(email: String, name: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.to_lowercase(),
            name,
            picture: None,
            password_hash,
            is_admin: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The identity a request is made on behalf of, as resolved from its token.
///
/// Passed explicitly into every repository call that needs viewer-relative
/// state (`is_liked`), instead of being read from ambient storage.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub user_id: Uuid,
    pub email: String,
}
