//! SeaORM entities for the community board schema.

pub mod comment;
pub mod comment_mention;
pub mod post;
pub mod post_like;
pub mod post_mention;
pub mod post_tag;
pub mod tag;
pub mod user;
