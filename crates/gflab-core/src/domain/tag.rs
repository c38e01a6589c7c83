use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tag entity - a free-text label, unique by lowercased name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

impl Tag {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_lowercase(),
        }
    }
}

/// A tag with its live usage count, for the popular-tags listing.
#[derive(Debug, Clone)]
pub struct TagUsage {
    pub tag: Tag,
    pub post_count: u64,
}
