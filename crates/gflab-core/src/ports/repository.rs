use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, CommentView, Mention, Post, PostType, PostView, TagUsage, User, Viewer};
use crate::error::{DomainError, RepoError};

/// Hard cap on `page_size`, matching the wire contract.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Filter and pagination parameters for the board listing.
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub post_type: Option<PostType>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub page: u64,
    pub page_size: u64,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            post_type: None,
            tag: None,
            search: None,
            page: 1,
            page_size: 20,
        }
    }
}

impl PostQuery {
    /// Validate pagination bounds at the service boundary.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.page < 1 {
            return Err(DomainError::Validation("page must be >= 1".into()));
        }
        if self.page_size < 1 {
            return Err(DomainError::Validation("page_size must be >= 1".into()));
        }
        if self.page_size > MAX_PAGE_SIZE {
            return Err(DomainError::Validation(format!(
                "page_size must be <= {MAX_PAGE_SIZE}"
            )));
        }
        Ok(())
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.page_size
    }
}

/// One page of posts plus the total count matching the filter.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<PostView>,
    pub total: u64,
}

/// Input for creating a post. Tags are already normalized (lowercased,
/// deduplicated) and mentions already resolved before this reaches a
/// repository.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub post: Post,
    pub tags: Vec<String>,
    pub mentions: Vec<Mention>,
}

/// Partial update for a post. `None` fields are left untouched. Tag and
/// mention replacement only happens when the caller supplied those fields
/// explicitly.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub mentions: Option<Vec<Mention>>,
    pub is_pinned: Option<bool>,
    pub is_resolved: Option<bool>,
}

/// Input for creating a comment, mentions already resolved.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub comment: Comment,
    pub mentions: Vec<Mention>,
}

/// Result of a like toggle.
#[derive(Debug, Clone, Copy)]
pub struct LikeStatus {
    pub liked: bool,
    pub like_count: u64,
}

/// Post repository - the post store plus its derived aggregates
/// (tag associations, mentions, likes, view counters).
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Filtered, paginated board listing. Pinned posts sort first, then
    /// newest first. An unknown tag filter yields an empty page with
    /// `total == 0`.
    async fn page(&self, query: &PostQuery, viewer: Option<&Viewer>)
    -> Result<PostPage, RepoError>;

    /// Bare post lookup, used for authorization checks.
    async fn find(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Full view of one post, without touching the view counter.
    async fn detail(&self, id: Uuid, viewer: Option<&Viewer>)
    -> Result<Option<PostView>, RepoError>;

    /// Atomically increment the view counter. Returns false if the post
    /// does not exist.
    async fn record_view(&self, id: Uuid) -> Result<bool, RepoError>;

    /// Insert a post with its tag associations and mentions. Tags are
    /// upserted into the tag index by name.
    async fn create(&self, new: NewPost) -> Result<PostView, RepoError>;

    /// Apply a partial update. Returns `RepoError::NotFound` for an
    /// unknown id.
    async fn update(&self, id: Uuid, patch: PostPatch) -> Result<(), RepoError>;

    /// Delete a post, cascading to its comments, mentions, tag
    /// associations and likes.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    /// Flip the viewer's membership in the post's like set. Atomic at the
    /// store layer: concurrent toggles must not lose updates.
    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> Result<LikeStatus, RepoError>;

    /// Forum posts ordered by like count, then newest first.
    async fn popular(&self, limit: u64, viewer: Option<&Viewer>)
    -> Result<Vec<PostView>, RepoError>;

    /// Posts in which `email` is mentioned (directly or in a comment),
    /// deduplicated by post id, newest first.
    async fn mentioned(
        &self,
        email: &str,
        page: u64,
        page_size: u64,
        viewer: Option<&Viewer>,
    ) -> Result<PostPage, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// All comments of a post in creation order, as a flat list. Grouping
    /// into the 2-level display structure is the caller's concern.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError>;

    /// Bare comment lookup, used to validate reply parents.
    async fn find(&self, id: Uuid) -> Result<Option<Comment>, RepoError>;

    async fn create(&self, new: NewComment) -> Result<CommentView, RepoError>;
}

/// Tag index - derived aggregate over live post-tag associations.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Tags with at least one live association, ordered by count
    /// descending, name ascending as tie-break.
    async fn list(&self, limit: u64) -> Result<Vec<TagUsage>, RepoError>;
}

/// User repository with the lookups mention resolution needs.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    /// Exact lookup by lowercased email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Exact lookup by display name.
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, RepoError>;

    /// First user whose email local part equals `prefix` (fallback for
    /// display-name mentions).
    async fn find_by_email_prefix(&self, prefix: &str) -> Result<Option<User>, RepoError>;

    /// Active users matching a case-insensitive name/email substring,
    /// ordered by name.
    async fn search(&self, term: Option<&str>, limit: u64) -> Result<Vec<User>, RepoError>;

    async fn save(&self, user: User) -> Result<User, RepoError>;
}
