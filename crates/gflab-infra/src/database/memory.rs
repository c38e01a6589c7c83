//! In-memory board store.
//!
//! A fully functional implementation of the board repositories backed by
//! a single async RwLock, used when `DATABASE_URL` is not configured and
//! as the substrate for tests. One lock guards the whole board, so the
//! contended operations (like toggles, view counters) are atomic by
//! construction. Data is lost on process restart.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use gflab_core::domain::{
    Comment, CommentView, Mention, Post, PostView, Tag, TagUsage, User, Viewer,
};
use gflab_core::error::RepoError;
use gflab_core::ports::{
    CommentRepository, LikeStatus, NewComment, NewPost, PostPage, PostPatch, PostQuery,
    PostRepository, TagRepository, UserRepository,
};

#[derive(Default)]
struct BoardData {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    tags: Vec<Tag>,
    /// (post_id, tag_id)
    post_tags: Vec<(Uuid, Uuid)>,
    /// (post_id, mention)
    post_mentions: Vec<(Uuid, Mention)>,
    /// (comment_id, mention)
    comment_mentions: Vec<(Uuid, Mention)>,
    /// (post_id, user_id)
    likes: Vec<(Uuid, Uuid)>,
}

impl BoardData {
    fn upsert_tag(&mut self, name: &str) -> Uuid {
        let normalized = name.to_lowercase();
        if let Some(tag) = self.tags.iter().find(|t| t.name == normalized) {
            return tag.id;
        }
        let tag = Tag::new(&normalized);
        let id = tag.id;
        self.tags.push(tag);
        id
    }

    fn link_post(&mut self, post_id: Uuid, tags: &[String], mentions: &[Mention]) {
        for name in tags {
            let tag_id = self.upsert_tag(name);
            if !self.post_tags.contains(&(post_id, tag_id)) {
                self.post_tags.push((post_id, tag_id));
            }
        }
        for mention in mentions {
            self.post_mentions.push((post_id, mention.clone()));
        }
    }

    fn view(&self, post: &Post, viewer: Option<&Viewer>) -> PostView {
        let comment_count = self
            .comments
            .iter()
            .filter(|c| c.post_id == post.id)
            .count() as u64;

        let mut tags: Vec<Tag> = self
            .post_tags
            .iter()
            .filter(|(post_id, _)| *post_id == post.id)
            .filter_map(|(_, tag_id)| self.tags.iter().find(|t| t.id == *tag_id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        let mentions: Vec<Mention> = self
            .post_mentions
            .iter()
            .filter(|(post_id, _)| *post_id == post.id)
            .map(|(_, mention)| mention.clone())
            .collect();

        let like_count = self
            .likes
            .iter()
            .filter(|(post_id, _)| *post_id == post.id)
            .count() as u64;
        let is_liked = viewer
            .map(|v| self.likes.contains(&(post.id, v.user_id)))
            .unwrap_or(false);

        PostView {
            post: post.clone(),
            like_count,
            is_liked,
            comment_count,
            tags,
            mentions,
        }
    }

    fn like_count(&self, post_id: Uuid) -> u64 {
        self.likes.iter().filter(|(p, _)| *p == post_id).count() as u64
    }
}

/// In-memory board store. Clone the `Arc` and coerce it into the
/// individual repository traits.
#[derive(Default)]
pub struct InMemoryBoard {
    inner: RwLock<BoardData>,
}

impl InMemoryBoard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl PostRepository for InMemoryBoard {
    async fn page(
        &self,
        query: &PostQuery,
        viewer: Option<&Viewer>,
    ) -> Result<PostPage, RepoError> {
        let data = self.inner.read().await;

        let tagged: Option<Vec<Uuid>> = match &query.tag {
            Some(tag_name) => {
                let normalized = tag_name.to_lowercase();
                match data.tags.iter().find(|t| t.name == normalized) {
                    Some(tag) => Some(
                        data.post_tags
                            .iter()
                            .filter(|(_, tag_id)| *tag_id == tag.id)
                            .map(|(post_id, _)| *post_id)
                            .collect(),
                    ),
                    None => {
                        return Ok(PostPage {
                            posts: Vec::new(),
                            total: 0,
                        });
                    }
                }
            }
            None => None,
        };

        let mut matches: Vec<&Post> = data
            .posts
            .iter()
            .filter(|p| query.post_type.is_none_or(|t| p.post_type == t))
            .filter(|p| tagged.as_ref().is_none_or(|ids| ids.contains(&p.id)))
            .filter(|p| match &query.search {
                Some(term) => {
                    let term = term.to_lowercase();
                    p.title.to_lowercase().contains(&term)
                        || p.content.to_lowercase().contains(&term)
                }
                None => true,
            })
            .collect();

        matches.sort_by(|a, b| {
            b.is_pinned
                .cmp(&a.is_pinned)
                .then(b.created_at.cmp(&a.created_at))
        });

        let total = matches.len() as u64;
        let posts = matches
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size as usize)
            .map(|p| data.view(p, viewer))
            .collect();

        Ok(PostPage { posts, total })
    }

    async fn find(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let data = self.inner.read().await;
        Ok(data.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn detail(
        &self,
        id: Uuid,
        viewer: Option<&Viewer>,
    ) -> Result<Option<PostView>, RepoError> {
        let data = self.inner.read().await;
        Ok(data
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| data.view(p, viewer)))
    }

    async fn record_view(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut data = self.inner.write().await;
        match data.posts.iter_mut().find(|p| p.id == id) {
            Some(post) => {
                post.view_count += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create(&self, new: NewPost) -> Result<PostView, RepoError> {
        let mut data = self.inner.write().await;
        let post_id = new.post.id;
        data.posts.push(new.post);
        data.link_post(post_id, &new.tags, &new.mentions);

        let post = data
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .expect("just inserted");
        Ok(data.view(post, None))
    }

    async fn update(&self, id: Uuid, patch: PostPatch) -> Result<(), RepoError> {
        let mut data = self.inner.write().await;

        let post = data
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(content) = patch.content {
            post.content = content;
        }
        if let Some(is_pinned) = patch.is_pinned {
            post.is_pinned = is_pinned;
        }
        if let Some(is_resolved) = patch.is_resolved {
            post.is_resolved = is_resolved;
        }
        post.updated_at = Utc::now();

        if let Some(tags) = &patch.tags {
            data.post_tags.retain(|(post_id, _)| *post_id != id);
            data.link_post(id, tags, &[]);
        }
        if let Some(mentions) = &patch.mentions {
            data.post_mentions.retain(|(post_id, _)| *post_id != id);
            data.link_post(id, &[], mentions);
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut data = self.inner.write().await;

        let before = data.posts.len();
        data.posts.retain(|p| p.id != id);
        if data.posts.len() == before {
            return Err(RepoError::NotFound);
        }

        let comment_ids: Vec<Uuid> = data
            .comments
            .iter()
            .filter(|c| c.post_id == id)
            .map(|c| c.id)
            .collect();
        data.comments.retain(|c| c.post_id != id);
        data.comment_mentions
            .retain(|(comment_id, _)| !comment_ids.contains(comment_id));
        data.post_tags.retain(|(post_id, _)| *post_id != id);
        data.post_mentions.retain(|(post_id, _)| *post_id != id);
        data.likes.retain(|(post_id, _)| *post_id != id);

        Ok(())
    }

    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> Result<LikeStatus, RepoError> {
        let mut data = self.inner.write().await;

        if !data.posts.iter().any(|p| p.id == id) {
            return Err(RepoError::NotFound);
        }

        let liked = if data.likes.contains(&(id, user_id)) {
            data.likes.retain(|entry| *entry != (id, user_id));
            false
        } else {
            data.likes.push((id, user_id));
            true
        };

        Ok(LikeStatus {
            liked,
            like_count: data.like_count(id),
        })
    }

    async fn popular(
        &self,
        limit: u64,
        viewer: Option<&Viewer>,
    ) -> Result<Vec<PostView>, RepoError> {
        let data = self.inner.read().await;

        let mut forum_posts: Vec<&Post> = data
            .posts
            .iter()
            .filter(|p| p.post_type == gflab_core::domain::PostType::Forum)
            .collect();
        forum_posts.sort_by(|a, b| {
            data.like_count(b.id)
                .cmp(&data.like_count(a.id))
                .then(b.created_at.cmp(&a.created_at))
        });

        Ok(forum_posts
            .into_iter()
            .take(limit as usize)
            .map(|p| data.view(p, viewer))
            .collect())
    }

    async fn mentioned(
        &self,
        email: &str,
        page: u64,
        page_size: u64,
        viewer: Option<&Viewer>,
    ) -> Result<PostPage, RepoError> {
        let data = self.inner.read().await;

        let mut ids: Vec<Uuid> = data
            .post_mentions
            .iter()
            .filter(|(_, m)| m.mentioned_email == email)
            .map(|(post_id, _)| *post_id)
            .collect();
        for (comment_id, mention) in &data.comment_mentions {
            if mention.mentioned_email == email {
                if let Some(comment) = data.comments.iter().find(|c| c.id == *comment_id) {
                    ids.push(comment.post_id);
                }
            }
        }

        let mut matches: Vec<&Post> = data
            .posts
            .iter()
            .filter(|p| ids.contains(&p.id))
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matches.len() as u64;
        let posts = matches
            .into_iter()
            .skip((page.saturating_sub(1) * page_size) as usize)
            .take(page_size as usize)
            .map(|p| data.view(p, viewer))
            .collect();

        Ok(PostPage { posts, total })
    }
}

#[async_trait]
impl CommentRepository for InMemoryBoard {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let data = self.inner.read().await;

        let mut comments: Vec<&Comment> = data
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(comments
            .into_iter()
            .map(|c| CommentView {
                comment: c.clone(),
                mentions: data
                    .comment_mentions
                    .iter()
                    .filter(|(comment_id, _)| *comment_id == c.id)
                    .map(|(_, m)| m.clone())
                    .collect(),
            })
            .collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let data = self.inner.read().await;
        Ok(data.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn create(&self, new: NewComment) -> Result<CommentView, RepoError> {
        let mut data = self.inner.write().await;
        let comment_id = new.comment.id;
        data.comments.push(new.comment.clone());
        for mention in &new.mentions {
            data.comment_mentions.push((comment_id, mention.clone()));
        }
        Ok(CommentView {
            comment: new.comment,
            mentions: new.mentions,
        })
    }
}

#[async_trait]
impl TagRepository for InMemoryBoard {
    async fn list(&self, limit: u64) -> Result<Vec<TagUsage>, RepoError> {
        let data = self.inner.read().await;

        let mut usages: Vec<TagUsage> = data
            .tags
            .iter()
            .filter_map(|tag| {
                let post_count = data
                    .post_tags
                    .iter()
                    .filter(|(_, tag_id)| *tag_id == tag.id)
                    .count() as u64;
                (post_count > 0).then(|| TagUsage {
                    tag: tag.clone(),
                    post_count,
                })
            })
            .collect();

        usages.sort_by(|a, b| {
            b.post_count
                .cmp(&a.post_count)
                .then_with(|| a.tag.name.cmp(&b.tag.name))
        });
        usages.truncate(limit as usize);
        Ok(usages)
    }
}

#[async_trait]
impl UserRepository for InMemoryBoard {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let data = self.inner.read().await;
        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let data = self.inner.read().await;
        let email = email.to_lowercase();
        Ok(data.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>, RepoError> {
        let data = self.inner.read().await;
        Ok(data.users.iter().find(|u| u.name == name).cloned())
    }

    async fn find_by_email_prefix(&self, prefix: &str) -> Result<Option<User>, RepoError> {
        let data = self.inner.read().await;
        let wanted = format!("{}@", prefix.to_lowercase());
        Ok(data
            .users
            .iter()
            .find(|u| u.email.starts_with(&wanted))
            .cloned())
    }

    async fn search(&self, term: Option<&str>, limit: u64) -> Result<Vec<User>, RepoError> {
        let data = self.inner.read().await;

        let mut users: Vec<&User> = data
            .users
            .iter()
            .filter(|u| u.is_active)
            .filter(|u| match term {
                Some(term) => {
                    let term = term.to_lowercase();
                    u.name.to_lowercase().contains(&term)
                        || u.email.to_lowercase().contains(&term)
                }
                None => true,
            })
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(users
            .into_iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut data = self.inner.write().await;

        if data
            .users
            .iter()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(RepoError::Constraint("email already registered".into()));
        }

        match data.users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => *slot = user.clone(),
            None => data.users.push(user.clone()),
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gflab_core::domain::PostType;

    fn user(email: &str, name: &str) -> User {
        User::new(email.into(), name.into(), "hash".into())
    }

    fn post(author: &User, post_type: PostType, title: &str, content: &str) -> Post {
        Post::new(
            post_type,
            title.into(),
            content.into(),
            author.id,
            author.email.clone(),
            author.name.clone(),
        )
    }

    fn new_post(post: Post, tags: Vec<&str>, mentions: Vec<Mention>) -> NewPost {
        NewPost {
            post,
            tags: tags.into_iter().map(String::from).collect(),
            mentions,
        }
    }

    // `create` exists on both PostRepository and CommentRepository, so
    // calls through the concrete store need the trait spelled out.
    async fn add_post(board: &InMemoryBoard, new: NewPost) -> PostView {
        PostRepository::create(board, new).await.unwrap()
    }

    async fn add_comment(board: &InMemoryBoard, post_id: Uuid, author: &User, text: &str, mentions: Vec<Mention>) -> CommentView {
        CommentRepository::create(
            board,
            NewComment {
                comment: Comment::new(
                    post_id,
                    text.into(),
                    author.id,
                    author.email.clone(),
                    author.name.clone(),
                    None,
                ),
                mentions,
            },
        )
        .await
        .unwrap()
    }

    async fn seeded_board() -> (Arc<InMemoryBoard>, User) {
        let board = InMemoryBoard::new();
        let author = user("author@lab.org", "Author");
        UserRepository::save(board.as_ref(), author.clone())
            .await
            .unwrap();
        (board, author)
    }

    fn mention(email: &str) -> Mention {
        Mention {
            mentioned_email: email.into(),
            mentioned_name: None,
        }
    }

    #[tokio::test]
    async fn page_length_and_total_are_consistent_across_pages() {
        let (board, author) = seeded_board().await;
        for i in 0..7 {
            add_post(
                &board,
                new_post(
                    post(&author, PostType::Forum, &format!("post {i}"), "body"),
                    vec![],
                    vec![],
                ),
            )
            .await;
        }

        let query = |page| PostQuery {
            page,
            page_size: 3,
            ..Default::default()
        };

        let first = board.page(&query(1), None).await.unwrap();
        assert_eq!(first.posts.len(), 3);
        assert_eq!(first.total, 7);

        let last = board.page(&query(3), None).await.unwrap();
        assert_eq!(last.posts.len(), 1);
        assert_eq!(last.total, 7);

        // Beyond the last page: empty list, true total.
        let beyond = board.page(&query(9), None).await.unwrap();
        assert!(beyond.posts.is_empty());
        assert_eq!(beyond.total, 7);
    }

    #[tokio::test]
    async fn repeated_tag_names_collapse_to_one_association() {
        let (board, author) = seeded_board().await;
        let view = add_post(
            &board,
            new_post(post(&author, PostType::Forum, "tagged", "body"), vec!["ai"], vec![]),
        )
        .await;
        // Re-linking the same name (any case) must not create extra tags
        // or associations.
        board
            .update(
                view.post.id,
                PostPatch {
                    tags: Some(vec!["ai".into(), "AI".into()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let tags = TagRepository::list(board.as_ref(), 50).await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].tag.name, "ai");
        assert_eq!(tags[0].post_count, 1);
    }

    #[tokio::test]
    async fn like_toggle_round_trips() {
        let (board, author) = seeded_board().await;
        let view = add_post(
            &board,
            new_post(post(&author, PostType::Forum, "likeable", "body"), vec![], vec![]),
        )
        .await;
        let post_id = view.post.id;

        let liked = board.toggle_like(post_id, author.id).await.unwrap();
        assert!(liked.liked);
        assert_eq!(liked.like_count, 1);

        let unliked = board.toggle_like(post_id, author.id).await.unwrap();
        assert!(!unliked.liked);
        assert_eq!(unliked.like_count, 0);
    }

    #[tokio::test]
    async fn deleting_a_post_cascades_to_comments_and_mentions() {
        let (board, author) = seeded_board().await;
        let view = add_post(
            &board,
            new_post(
                post(&author, PostType::Request, "help", "body"),
                vec!["q"],
                vec![mention("jane@x.com")],
            ),
        )
        .await;
        let post_id = view.post.id;

        add_comment(&board, post_id, &author, "a reply", vec![mention("jane@x.com")]).await;

        PostRepository::delete(board.as_ref(), post_id)
            .await
            .unwrap();

        assert!(board.list_for_post(post_id).await.unwrap().is_empty());
        let mentioned = board.mentioned("jane@x.com", 1, 20, None).await.unwrap();
        assert_eq!(mentioned.total, 0);
        assert!(
            TagRepository::list(board.as_ref(), 50)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn view_counter_increments_once_per_fetch() {
        let (board, author) = seeded_board().await;
        let mut seeded = post(&author, PostType::Forum, "viewed", "body");
        seeded.view_count = 10;
        let view = add_post(&board, new_post(seeded, vec![], vec![])).await;
        let post_id = view.post.id;

        for _ in 0..3 {
            assert!(board.record_view(post_id).await.unwrap());
        }

        let detail = board.detail(post_id, None).await.unwrap().unwrap();
        assert_eq!(detail.post.view_count, 13);
    }

    #[tokio::test]
    async fn unknown_tag_filter_returns_empty_page_with_zero_total() {
        let (board, author) = seeded_board().await;
        add_post(
            &board,
            new_post(post(&author, PostType::Forum, "a", "b"), vec!["real"], vec![]),
        )
        .await;

        let page = board
            .page(
                &PostQuery {
                    tag: Some("no-such-tag".into()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert!(page.posts.is_empty());
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_over_title_and_content() {
        let (board, author) = seeded_board().await;
        add_post(
            &board,
            new_post(
                post(&author, PostType::Forum, "Fundraising tips", "plain body"),
                vec![],
                vec![],
            ),
        )
        .await;
        add_post(
            &board,
            new_post(
                post(&author, PostType::Forum, "other", "about FUNDRAISING too"),
                vec![],
                vec![],
            ),
        )
        .await;
        add_post(
            &board,
            new_post(post(&author, PostType::Forum, "unrelated", "nothing"), vec![], vec![]),
        )
        .await;

        let page = board
            .page(
                &PostQuery {
                    search: Some("fundraising".into()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn pinned_notices_sort_before_newer_posts() {
        let (board, author) = seeded_board().await;
        let pinned = add_post(
            &board,
            new_post(post(&author, PostType::Notice, "old but pinned", "body"), vec![], vec![]),
        )
        .await;
        board
            .update(
                pinned.post.id,
                PostPatch {
                    is_pinned: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        add_post(
            &board,
            new_post(post(&author, PostType::Notice, "newer", "body"), vec![], vec![]),
        )
        .await;

        let page = board.page(&PostQuery::default(), None).await.unwrap();
        assert_eq!(page.posts[0].post.title, "old but pinned");
    }

    #[tokio::test]
    async fn mentioned_posts_deduplicate_across_post_and_comments() {
        let (board, author) = seeded_board().await;
        let view = add_post(
            &board,
            new_post(
                post(&author, PostType::Forum, "a", "b"),
                vec![],
                vec![mention("jane@x.com")],
            ),
        )
        .await;

        for _ in 0..2 {
            add_comment(&board, view.post.id, &author, "ping", vec![mention("jane@x.com")]).await;
        }

        let page = board.mentioned("jane@x.com", 1, 20, None).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.posts.len(), 1);
    }

    #[tokio::test]
    async fn popular_orders_forum_posts_by_like_count() {
        let (board, author) = seeded_board().await;
        let first = add_post(
            &board,
            new_post(post(&author, PostType::Forum, "one", "b"), vec![], vec![]),
        )
        .await;
        let second = add_post(
            &board,
            new_post(post(&author, PostType::Forum, "two", "b"), vec![], vec![]),
        )
        .await;
        // Notices never appear in the popular listing.
        add_post(
            &board,
            new_post(post(&author, PostType::Notice, "n", "b"), vec![], vec![]),
        )
        .await;

        let fan = user("fan@lab.org", "Fan");
        UserRepository::save(board.as_ref(), fan.clone())
            .await
            .unwrap();
        board.toggle_like(second.post.id, author.id).await.unwrap();
        board.toggle_like(second.post.id, fan.id).await.unwrap();
        board.toggle_like(first.post.id, fan.id).await.unwrap();

        let popular = board.popular(3, None).await.unwrap();
        assert_eq!(popular.len(), 2);
        assert_eq!(popular[0].post.title, "two");
        assert_eq!(popular[0].like_count, 2);
    }

    #[tokio::test]
    async fn comments_list_in_creation_order() {
        let (board, author) = seeded_board().await;
        let view = add_post(
            &board,
            new_post(post(&author, PostType::Forum, "t", "b"), vec![], vec![]),
        )
        .await;

        for i in 0..3 {
            add_comment(&board, view.post.id, &author, &format!("comment {i}"), vec![]).await;
        }

        let comments = board.list_for_post(view.post.id).await.unwrap();
        let contents: Vec<_> = comments
            .iter()
            .map(|c| c.comment.content.as_str())
            .collect();
        assert_eq!(contents, vec!["comment 0", "comment 1", "comment 2"]);
    }

    #[tokio::test]
    async fn user_search_filters_inactive_and_matches_substring() {
        let board = InMemoryBoard::new();
        let mut inactive = user("gone@lab.org", "Gone Person");
        inactive.is_active = false;
        UserRepository::save(board.as_ref(), inactive)
            .await
            .unwrap();
        UserRepository::save(board.as_ref(), user("jane@x.com", "Jane Park"))
            .await
            .unwrap();
        UserRepository::save(board.as_ref(), user("john.doe@lab.org", "John Doe"))
            .await
            .unwrap();

        let hits = board.search(Some("JAN"), 20).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].email, "jane@x.com");

        let all = board.search(None, 20).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_email_registration_is_rejected() {
        let board = InMemoryBoard::new();
        UserRepository::save(board.as_ref(), user("a@b.co", "A"))
            .await
            .unwrap();
        let err = UserRepository::save(board.as_ref(), user("a@b.co", "Other"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }
}
