//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use gflab_core::domain::PostType;

/// Board discriminator as stored in the database.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PostKind {
    #[sea_orm(string_value = "notice")]
    Notice,
    #[sea_orm(string_value = "forum")]
    Forum,
    #[sea_orm(string_value = "request")]
    Request,
}

impl From<PostType> for PostKind {
    fn from(value: PostType) -> Self {
        match value {
            PostType::Notice => PostKind::Notice,
            PostType::Forum => PostKind::Forum,
            PostType::Request => PostKind::Request,
        }
    }
}

impl From<PostKind> for PostType {
    fn from(value: PostKind) -> Self {
        match value {
            PostKind::Notice => PostType::Notice,
            PostKind::Forum => PostType::Forum,
            PostKind::Request => PostType::Request,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_type: PostKind,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub author_id: Uuid,
    pub author_email: String,
    pub author_name: String,
    pub is_pinned: bool,
    pub is_resolved: bool,
    pub view_count: i64,
    pub image_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
    #[sea_orm(has_many = "super::post_tag::Entity")]
    PostTags,
    #[sea_orm(has_many = "super::post_mention::Entity")]
    Mentions,
    #[sea_orm(has_many = "super::post_like::Entity")]
    Likes,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for gflab_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            post_type: model.post_type.into(),
            title: model.title,
            content: model.content,
            author_id: model.author_id,
            author_email: model.author_email,
            author_name: model.author_name,
            is_pinned: model.is_pinned,
            is_resolved: model.is_resolved,
            view_count: model.view_count,
            image_url: model.image_url,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<gflab_core::domain::Post> for ActiveModel {
    fn from(post: gflab_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            post_type: Set(post.post_type.into()),
            title: Set(post.title),
            content: Set(post.content),
            author_id: Set(post.author_id),
            author_email: Set(post.author_email),
            author_name: Set(post.author_name),
            is_pinned: Set(post.is_pinned),
            is_resolved: Set(post.is_resolved),
            view_count: Set(post.view_count),
            image_url: Set(post.image_url),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
