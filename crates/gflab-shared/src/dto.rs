//! Data Transfer Objects - request/response types for the community API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Auth

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Response containing a user's public profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Compact user record for mention autocomplete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

// ---------------------------------------------------------------------------
// Posts

/// Query parameters of the board listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPostsParams {
    pub post_type: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub post_type: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub mentions: Vec<String>,
    pub image_url: Option<String>,
}

/// Partial update of a post. Absent fields are left untouched; `tags`
/// and `mentions` replace the stored sets only when supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub mentions: Option<Vec<String>>,
    pub is_pinned: Option<bool>,
    pub is_resolved: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionResponse {
    pub mentioned_email: String,
    pub mentioned_name: Option<String>,
}

/// A post as the API returns it, derived fields included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub post_type: String,
    pub title: String,
    pub content: String,
    pub author_email: String,
    pub author_name: String,
    pub is_pinned: bool,
    pub is_resolved: bool,
    pub view_count: i64,
    pub image_url: Option<String>,
    pub like_count: u64,
    pub is_liked: bool,
    pub comment_count: u64,
    pub tags: Vec<TagRef>,
    pub mentions: Vec<MentionResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: u64,
}

// ---------------------------------------------------------------------------
// Comments

/// Request to create a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub mentions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    pub author_email: String,
    pub author_name: String,
    pub parent_id: Option<Uuid>,
    pub mentions: Vec<MentionResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tags

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
    pub post_count: u64,
}
