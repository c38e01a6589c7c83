use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Mention;

/// Comment entity - belongs to a post, optionally replying to another
/// comment on the same post. One level of nesting is rendered; deeper
/// replies are flattened under the top-level comment by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub author_email: String,
    pub author_name: String,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        post_id: Uuid,
        content: String,
        author_id: Uuid,
        author_email: String,
        author_name: String,
        parent_id: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            post_id,
            content: content.trim().to_string(),
            author_id,
            author_email,
            author_name,
            parent_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A comment together with the mentions recorded at write time.
#[derive(Debug, Clone)]
pub struct CommentView {
    pub comment: Comment,
    pub mentions: Vec<Mention>,
}
