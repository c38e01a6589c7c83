use serde::{Deserialize, Serialize};

/// A resolved reference from post/comment text to a user identity.
///
/// Mentions have no independent lifecycle; they are owned by the post or
/// comment that produced them at write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub mentioned_email: String,
    pub mentioned_name: Option<String>,
}
