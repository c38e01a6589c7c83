//! Comment entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub author_id: Uuid,
    pub author_email: String,
    pub author_name: String,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Post,
    #[sea_orm(has_many = "super::comment_mention::Entity")]
    Mentions,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Comment.
impl From<Model> for gflab_core::domain::Comment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            content: model.content,
            author_id: model.author_id,
            author_email: model.author_email,
            author_name: model.author_name,
            parent_id: model.parent_id,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Comment to SeaORM ActiveModel.
impl From<gflab_core::domain::Comment> for ActiveModel {
    fn from(comment: gflab_core::domain::Comment) -> Self {
        Self {
            id: Set(comment.id),
            post_id: Set(comment.post_id),
            content: Set(comment.content),
            author_id: Set(comment.author_id),
            author_email: Set(comment.author_email),
            author_name: Set(comment.author_name),
            parent_id: Set(comment.parent_id),
            created_at: Set(comment.created_at.into()),
            updated_at: Set(comment.updated_at.into()),
        }
    }
}
