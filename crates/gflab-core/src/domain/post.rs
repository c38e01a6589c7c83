use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Mention, Tag};
use crate::error::DomainError;

/// Board a post belongs to. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Notice,
    Forum,
    Request,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Notice => "notice",
            PostType::Forum => "forum",
            PostType::Request => "request",
        }
    }
}

impl std::str::FromStr for PostType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notice" => Ok(PostType::Notice),
            "forum" => Ok(PostType::Forum),
            "request" => Ok(PostType::Request),
            other => Err(DomainError::Validation(format!(
                "unknown post type: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for PostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post entity - a unit of board content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub post_type: PostType,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_email: String,
    pub author_name: String,
    pub is_pinned: bool,
    pub is_resolved: bool,
    pub view_count: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post. Title and content are stored trimmed.
    pub fn new(
        post_type: PostType,
        title: String,
        content: String,
        author_id: Uuid,
        author_email: String,
        author_name: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            post_type,
            title: title.trim().to_string(),
            content: content.trim().to_string(),
            author_id,
            author_email,
            author_name,
            is_pinned: false,
            is_resolved: false,
            view_count: 0,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A post together with its derived state, assembled per request.
///
/// `is_liked` is always relative to the viewer the repository was given;
/// anonymous viewers see `false`.
#[derive(Debug, Clone)]
pub struct PostView {
    pub post: Post,
    pub like_count: u64,
    pub is_liked: bool,
    pub comment_count: u64,
    pub tags: Vec<Tag>,
    pub mentions: Vec<Mention>,
}
