//! Tag entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post_tag::Entity")]
    PostTags,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for gflab_core::domain::Tag {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

impl From<gflab_core::domain::Tag> for ActiveModel {
    fn from(tag: gflab_core::domain::Tag) -> Self {
        Self {
            id: Set(tag.id),
            name: Set(tag.name),
            created_at: Set(chrono::Utc::now().into()),
        }
    }
}
