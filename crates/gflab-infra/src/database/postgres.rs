//! PostgreSQL repository implementations.
//!
//! Derived post state (tag refs, mentions, like/comment counts) is
//! assembled per post. Counter updates and like toggles run inside a
//! transaction so concurrent requests cannot lose updates.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbConn, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use gflab_core::domain::{
    Comment, CommentView, Mention, Post, PostView, Tag, TagUsage, User, Viewer,
};
use gflab_core::error::RepoError;
use gflab_core::ports::{
    CommentRepository, LikeStatus, NewComment, NewPost, PostPage, PostPatch, PostQuery,
    PostRepository, TagRepository, UserRepository,
};

use super::entity::post::PostKind;
use super::entity::{comment, comment_mention, post, post_like, post_mention, post_tag, tag, user};

fn qerr(e: DbErr) -> RepoError {
    let msg = e.to_string();
    if msg.contains("duplicate") || msg.contains("unique") {
        RepoError::Constraint(msg)
    } else {
        RepoError::Query(msg)
    }
}

fn empty_page() -> PostPage {
    PostPage {
        posts: Vec::new(),
        total: 0,
    }
}

/// Find a tag by normalized name, creating it if missing.
async fn upsert_tag<C: ConnectionTrait>(conn: &C, name: &str) -> Result<tag::Model, RepoError> {
    let normalized = name.to_lowercase();
    if let Some(existing) = tag::Entity::find()
        .filter(tag::Column::Name.eq(normalized.clone()))
        .one(conn)
        .await
        .map_err(qerr)?
    {
        return Ok(existing);
    }

    let model: tag::ActiveModel = Tag::new(&normalized).into();
    model.insert(conn).await.map_err(qerr)
}

async fn insert_post_associations<C: ConnectionTrait>(
    conn: &C,
    post_id: Uuid,
    tags: &[String],
    mentions: &[Mention],
) -> Result<(), RepoError> {
    for name in tags {
        let tag_row = upsert_tag(conn, name).await?;
        post_tag::ActiveModel {
            id: Set(Uuid::new_v4()),
            post_id: Set(post_id),
            tag_id: Set(tag_row.id),
        }
        .insert(conn)
        .await
        .map_err(qerr)?;
    }

    for mention in mentions {
        post_mention::ActiveModel {
            id: Set(Uuid::new_v4()),
            post_id: Set(post_id),
            mentioned_email: Set(mention.mentioned_email.clone()),
            mentioned_name: Set(mention.mentioned_name.clone()),
        }
        .insert(conn)
        .await
        .map_err(qerr)?;
    }

    Ok(())
}

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Attach derived state to a post row.
    async fn assemble(
        &self,
        model: post::Model,
        viewer: Option<&Viewer>,
    ) -> Result<PostView, RepoError> {
        let post_id = model.id;

        let comment_count = comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(qerr)?;

        let tag_ids: Vec<Uuid> = post_tag::Entity::find()
            .filter(post_tag::Column::PostId.eq(post_id))
            .all(&self.db)
            .await
            .map_err(qerr)?
            .into_iter()
            .map(|row| row.tag_id)
            .collect();

        let mut tags: Vec<Tag> = if tag_ids.is_empty() {
            Vec::new()
        } else {
            tag::Entity::find()
                .filter(tag::Column::Id.is_in(tag_ids))
                .all(&self.db)
                .await
                .map_err(qerr)?
                .into_iter()
                .map(Into::into)
                .collect()
        };
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        let mentions: Vec<Mention> = post_mention::Entity::find()
            .filter(post_mention::Column::PostId.eq(post_id))
            .all(&self.db)
            .await
            .map_err(qerr)?
            .into_iter()
            .map(Into::into)
            .collect();

        let like_count = post_like::Entity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(qerr)?;

        let is_liked = match viewer {
            Some(viewer) => post_like::Entity::find()
                .filter(post_like::Column::PostId.eq(post_id))
                .filter(post_like::Column::UserId.eq(viewer.user_id))
                .one(&self.db)
                .await
                .map_err(qerr)?
                .is_some(),
            None => false,
        };

        Ok(PostView {
            post: model.into(),
            like_count,
            is_liked,
            comment_count,
            tags,
            mentions,
        })
    }

    async fn assemble_all(
        &self,
        models: Vec<post::Model>,
        viewer: Option<&Viewer>,
    ) -> Result<Vec<PostView>, RepoError> {
        let mut views = Vec::with_capacity(models.len());
        for model in models {
            views.push(self.assemble(model, viewer).await?);
        }
        Ok(views)
    }

    /// Post ids in which `email` is mentioned, directly or through a
    /// comment, deduplicated.
    async fn mentioned_post_ids(&self, email: &str) -> Result<Vec<Uuid>, RepoError> {
        let mut ids: Vec<Uuid> = post_mention::Entity::find()
            .filter(post_mention::Column::MentionedEmail.eq(email))
            .all(&self.db)
            .await
            .map_err(qerr)?
            .into_iter()
            .map(|row| row.post_id)
            .collect();

        let comment_ids: Vec<Uuid> = comment_mention::Entity::find()
            .filter(comment_mention::Column::MentionedEmail.eq(email))
            .all(&self.db)
            .await
            .map_err(qerr)?
            .into_iter()
            .map(|row| row.comment_id)
            .collect();

        if !comment_ids.is_empty() {
            let from_comments = comment::Entity::find()
                .filter(comment::Column::Id.is_in(comment_ids))
                .all(&self.db)
                .await
                .map_err(qerr)?;
            ids.extend(from_comments.into_iter().map(|row| row.post_id));
        }

        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn page(
        &self,
        query: &PostQuery,
        viewer: Option<&Viewer>,
    ) -> Result<PostPage, RepoError> {
        let mut select = post::Entity::find();

        if let Some(post_type) = query.post_type {
            select = select.filter(post::Column::PostType.eq(PostKind::from(post_type)));
        }

        if let Some(tag_name) = &query.tag {
            let tag_row = tag::Entity::find()
                .filter(tag::Column::Name.eq(tag_name.to_lowercase()))
                .one(&self.db)
                .await
                .map_err(qerr)?;
            let Some(tag_row) = tag_row else {
                return Ok(empty_page());
            };

            let post_ids: Vec<Uuid> = post_tag::Entity::find()
                .filter(post_tag::Column::TagId.eq(tag_row.id))
                .all(&self.db)
                .await
                .map_err(qerr)?
                .into_iter()
                .map(|row| row.post_id)
                .collect();
            if post_ids.is_empty() {
                return Ok(empty_page());
            }
            select = select.filter(post::Column::Id.is_in(post_ids));
        }

        if let Some(term) = &query.search {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((post::Entity, post::Column::Title))))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            post::Entity,
                            post::Column::Content,
                        ))))
                        .like(pattern),
                    ),
            );
        }

        let select = select
            .order_by_desc(post::Column::IsPinned)
            .order_by_desc(post::Column::CreatedAt);

        let total = select.clone().count(&self.db).await.map_err(qerr)?;
        let models = select
            .offset(query.offset())
            .limit(query.page_size)
            .all(&self.db)
            .await
            .map_err(qerr)?;

        Ok(PostPage {
            posts: self.assemble_all(models, viewer).await?,
            total,
        })
    }

    async fn find(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let model = post::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(qerr)?;
        Ok(model.map(Into::into))
    }

    async fn detail(
        &self,
        id: Uuid,
        viewer: Option<&Viewer>,
    ) -> Result<Option<PostView>, RepoError> {
        let Some(model) = post::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(qerr)?
        else {
            return Ok(None);
        };
        Ok(Some(self.assemble(model, viewer).await?))
    }

    async fn record_view(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = post::Entity::update_many()
            .col_expr(
                post::Column::ViewCount,
                Expr::col(post::Column::ViewCount).add(1),
            )
            .filter(post::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(qerr)?;
        Ok(result.rows_affected > 0)
    }

    async fn create(&self, new: NewPost) -> Result<PostView, RepoError> {
        let post_id = new.post.id;

        let txn = self.db.begin().await.map_err(qerr)?;
        let model: post::ActiveModel = new.post.into();
        model.insert(&txn).await.map_err(qerr)?;
        insert_post_associations(&txn, post_id, &new.tags, &new.mentions).await?;
        txn.commit().await.map_err(qerr)?;

        self.detail(post_id, None)
            .await?
            .ok_or(RepoError::NotFound)
    }

    async fn update(&self, id: Uuid, patch: PostPatch) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(qerr)?;

        let Some(existing) = post::Entity::find_by_id(id).one(&txn).await.map_err(qerr)? else {
            return Err(RepoError::NotFound);
        };

        let mut model: post::ActiveModel = existing.into();
        if let Some(title) = patch.title {
            model.title = Set(title);
        }
        if let Some(content) = patch.content {
            model.content = Set(content);
        }
        if let Some(is_pinned) = patch.is_pinned {
            model.is_pinned = Set(is_pinned);
        }
        if let Some(is_resolved) = patch.is_resolved {
            model.is_resolved = Set(is_resolved);
        }
        model.updated_at = Set(Utc::now().into());
        model.update(&txn).await.map_err(qerr)?;

        if let Some(tags) = &patch.tags {
            post_tag::Entity::delete_many()
                .filter(post_tag::Column::PostId.eq(id))
                .exec(&txn)
                .await
                .map_err(qerr)?;
            insert_post_associations(&txn, id, tags, &[]).await?;
        }

        if let Some(mentions) = &patch.mentions {
            post_mention::Entity::delete_many()
                .filter(post_mention::Column::PostId.eq(id))
                .exec(&txn)
                .await
                .map_err(qerr)?;
            insert_post_associations(&txn, id, &[], mentions).await?;
        }

        txn.commit().await.map_err(qerr)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        // Comments, mentions, tag links and likes go with the post via
        // ON DELETE CASCADE.
        let result = post::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(qerr)?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> Result<LikeStatus, RepoError> {
        let txn = self.db.begin().await.map_err(qerr)?;

        if post::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(qerr)?
            .is_none()
        {
            return Err(RepoError::NotFound);
        }

        let existing = post_like::Entity::find()
            .filter(post_like::Column::PostId.eq(id))
            .filter(post_like::Column::UserId.eq(user_id))
            .one(&txn)
            .await
            .map_err(qerr)?;

        let liked = match existing {
            Some(like) => {
                post_like::Entity::delete_by_id(like.id)
                    .exec(&txn)
                    .await
                    .map_err(qerr)?;
                false
            }
            None => {
                post_like::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    post_id: Set(id),
                    user_id: Set(user_id),
                    created_at: Set(Utc::now().into()),
                }
                .insert(&txn)
                .await
                .map_err(qerr)?;
                true
            }
        };

        let like_count = post_like::Entity::find()
            .filter(post_like::Column::PostId.eq(id))
            .count(&txn)
            .await
            .map_err(qerr)?;

        txn.commit().await.map_err(qerr)?;

        Ok(LikeStatus { liked, like_count })
    }

    async fn popular(
        &self,
        limit: u64,
        viewer: Option<&Viewer>,
    ) -> Result<Vec<PostView>, RepoError> {
        let counts: Vec<(Uuid, i64)> = post_like::Entity::find()
            .select_only()
            .column(post_like::Column::PostId)
            .column_as(post_like::Column::Id.count(), "like_count")
            .group_by(post_like::Column::PostId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(qerr)?;
        let count_of = |id: Uuid| {
            counts
                .iter()
                .find(|(post_id, _)| *post_id == id)
                .map(|(_, n)| *n)
                .unwrap_or(0)
        };

        let mut models = post::Entity::find()
            .filter(post::Column::PostType.eq(PostKind::Forum))
            .all(&self.db)
            .await
            .map_err(qerr)?;
        models.sort_by(|a, b| {
            count_of(b.id)
                .cmp(&count_of(a.id))
                .then(b.created_at.cmp(&a.created_at))
        });
        models.truncate(limit as usize);

        self.assemble_all(models, viewer).await
    }

    async fn mentioned(
        &self,
        email: &str,
        page: u64,
        page_size: u64,
        viewer: Option<&Viewer>,
    ) -> Result<PostPage, RepoError> {
        let ids = self.mentioned_post_ids(email).await?;
        if ids.is_empty() {
            return Ok(empty_page());
        }

        let select = post::Entity::find()
            .filter(post::Column::Id.is_in(ids))
            .order_by_desc(post::Column::CreatedAt);

        let total = select.clone().count(&self.db).await.map_err(qerr)?;
        let models = select
            .offset(page.saturating_sub(1) * page_size)
            .limit(page_size)
            .all(&self.db)
            .await
            .map_err(qerr)?;

        Ok(PostPage {
            posts: self.assemble_all(models, viewer).await?,
            total,
        })
    }
}

/// PostgreSQL comment repository.
pub struct PostgresCommentRepository {
    db: DbConn,
}

impl PostgresCommentRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    async fn mentions_of(&self, comment_id: Uuid) -> Result<Vec<Mention>, RepoError> {
        Ok(comment_mention::Entity::find()
            .filter(comment_mention::Column::CommentId.eq(comment_id))
            .all(&self.db)
            .await
            .map_err(qerr)?
            .into_iter()
            .map(Into::into)
            .collect())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let models = comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(qerr)?;

        let mut views = Vec::with_capacity(models.len());
        for model in models {
            let mentions = self.mentions_of(model.id).await?;
            views.push(CommentView {
                comment: model.into(),
                mentions,
            });
        }
        Ok(views)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let model = comment::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(qerr)?;
        Ok(model.map(Into::into))
    }

    async fn create(&self, new: NewComment) -> Result<CommentView, RepoError> {
        let comment_id = new.comment.id;

        let txn = self.db.begin().await.map_err(qerr)?;
        let model: comment::ActiveModel = new.comment.clone().into();
        model.insert(&txn).await.map_err(qerr)?;
        for mention in &new.mentions {
            comment_mention::ActiveModel {
                id: Set(Uuid::new_v4()),
                comment_id: Set(comment_id),
                mentioned_email: Set(mention.mentioned_email.clone()),
                mentioned_name: Set(mention.mentioned_name.clone()),
            }
            .insert(&txn)
            .await
            .map_err(qerr)?;
        }
        txn.commit().await.map_err(qerr)?;

        Ok(CommentView {
            comment: new.comment,
            mentions: new.mentions,
        })
    }
}

/// PostgreSQL tag repository.
pub struct PostgresTagRepository {
    db: DbConn,
}

impl PostgresTagRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn list(&self, limit: u64) -> Result<Vec<TagUsage>, RepoError> {
        let counts: Vec<(Uuid, i64)> = post_tag::Entity::find()
            .select_only()
            .column(post_tag::Column::TagId)
            .column_as(post_tag::Column::Id.count(), "post_count")
            .group_by(post_tag::Column::TagId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(qerr)?;
        if counts.is_empty() {
            return Ok(Vec::new());
        }

        let tag_ids: Vec<Uuid> = counts.iter().map(|(id, _)| *id).collect();
        let tags = tag::Entity::find()
            .filter(tag::Column::Id.is_in(tag_ids))
            .all(&self.db)
            .await
            .map_err(qerr)?;

        let mut usages: Vec<TagUsage> = tags
            .into_iter()
            .map(|model| {
                let post_count = counts
                    .iter()
                    .find(|(id, _)| *id == model.id)
                    .map(|(_, n)| *n as u64)
                    .unwrap_or(0);
                TagUsage {
                    tag: model.into(),
                    post_count,
                }
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

/// PostgreSQL user repository.
pub struct PostgresUserRepository {
    db: DbConn,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(qerr)?;
        Ok(model.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(qerr)?;
        Ok(model.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>, RepoError> {
        let model = user::Entity::find()
            .filter(user::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(qerr)?;
        Ok(model.map(Into::into))
    }

    async fn find_by_email_prefix(&self, prefix: &str) -> Result<Option<User>, RepoError> {
        let model = user::Entity::find()
            .filter(user::Column::Email.like(format!("{}@%", prefix.to_lowercase())))
            .one(&self.db)
            .await
            .map_err(qerr)?;
        Ok(model.map(Into::into))
    }

    async fn search(&self, term: Option<&str>, limit: u64) -> Result<Vec<User>, RepoError> {
        let mut select = user::Entity::find().filter(user::Column::IsActive.eq(true));

        if let Some(term) = term {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((user::Entity, user::Column::Name))))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((user::Entity, user::Column::Email))))
                            .like(pattern),
                    ),
            );
        }

        let models = select
            .order_by_asc(user::Column::Name)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(qerr)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn save(&self, user_entity: User) -> Result<User, RepoError> {
        let exists = user::Entity::find_by_id(user_entity.id)
            .one(&self.db)
            .await
            .map_err(qerr)?
            .is_some();

        let model: user::ActiveModel = user_entity.clone().into();
        if exists {
            model.update(&self.db).await.map_err(qerr)?;
        } else {
            model.insert(&self.db).await.map_err(qerr)?;
        }
        Ok(user_entity)
    }
}
