//! Mention and tag extraction from post/comment bodies.
//!
//! Mentions come in two shapes that share one resolution path:
//! `@a@b.com` (email form) and `@Display_Name` (name form, underscores
//! standing in for spaces). Extraction runs left to right in a single
//! pass; an email-form token consumes its whole span, so the local part
//! is never re-matched as a name mention.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::Mention;
use crate::error::RepoError;
use crate::ports::UserRepository;

static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"@(?:(?P<email>[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,})|(?P<name>[A-Za-z0-9_]+))",
    )
    .expect("mention pattern")
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(\w+)").expect("tag pattern"));

/// Extract `@mention` tokens in order of appearance, deduplicated.
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in MENTION_RE.captures_iter(text) {
        let token = caps
            .name("email")
            .or_else(|| caps.name("name"))
            .map(|m| m.as_str().to_string())
            .expect("one alternative always matches");
        if !seen.contains(&token) {
            seen.push(token);
        }
    }
    seen
}

/// Extract `#tag` tokens, lowercased and deduplicated.
pub fn extract_tags(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in TAG_RE.captures_iter(text) {
        let tag = caps[1].to_lowercase();
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

/// Union of explicitly supplied tags and tags extracted from content,
/// normalized to lowercase and deduplicated.
pub fn collect_tags(explicit: &[String], content: &str) -> Vec<String> {
    let mut tags = Vec::new();
    for raw in explicit {
        let tag = raw.trim().trim_start_matches('#').to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    for tag in extract_tags(content) {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Union of explicitly supplied mention tokens and tokens extracted from
/// content, deduplicated, not yet resolved.
pub fn collect_mention_tokens(explicit: &[String], content: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for raw in explicit {
        let token = raw.trim().trim_start_matches('@').to_string();
        if !token.is_empty() && !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    for token in extract_mentions(content) {
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

/// Resolve mention tokens against known user identities.
///
/// Email-form tokens resolve by exact (lowercased) email; name-form
/// tokens by display name with underscores read as spaces, then by email
/// local part. Tokens that resolve to no known user are dropped - that is
/// policy, not an error. The result is deduplicated by email.
pub async fn resolve_mentions(
    tokens: &[String],
    users: &dyn UserRepository,
) -> Result<Vec<Mention>, RepoError> {
    let mut mentions: Vec<Mention> = Vec::new();
    for token in tokens {
        let user = if token.contains('@') {
            users.find_by_email(&token.to_lowercase()).await?
        } else {
            let name = token.replace('_', " ");
            match users.find_by_name(&name).await? {
                Some(user) => Some(user),
                None => users.find_by_email_prefix(token).await?,
            }
        };

        if let Some(user) = user {
            if !mentions.iter().any(|m| m.mentioned_email == user.email) {
                mentions.push(Mention {
                    mentioned_email: user.email,
                    mentioned_name: Some(user.name),
                });
            }
        }
    }
    Ok(mentions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use async_trait::async_trait;
    use uuid::Uuid;

    #[test]
    fn extracts_email_and_name_mentions() {
        let text = "ping @jane@x.com and @John_Doe about this";
        assert_eq!(extract_mentions(text), vec!["jane@x.com", "John_Doe"]);
    }

    #[test]
    fn email_local_part_is_not_rematched_as_name() {
        let tokens = extract_mentions("@jane@x.com");
        assert_eq!(tokens, vec!["jane@x.com"]);
    }

    #[test]
    fn extraction_deduplicates() {
        let text = "@bob @bob and #News #news #NEWS";
        assert_eq!(extract_mentions(text), vec!["bob"]);
        assert_eq!(extract_tags(text), vec!["news"]);
    }

    #[test]
    fn tags_are_lowercased() {
        assert_eq!(extract_tags("see #AI and #Rust2024"), vec!["ai", "rust2024"]);
    }

    #[test]
    fn collect_tags_unions_explicit_and_content() {
        let tags = collect_tags(
            &["AI".to_string(), "ai".to_string(), "#Ai".to_string()],
            "more on #news here",
        );
        assert_eq!(tags, vec!["ai", "news"]);
    }

    #[test]
    fn collect_mention_tokens_strips_leading_at() {
        let tokens = collect_mention_tokens(&["@carol".to_string()], "cc @dave");
        assert_eq!(tokens, vec!["carol", "dave"]);
    }

    struct FixedUsers(Vec<User>);

    #[async_trait]
    impl UserRepository for FixedUsers {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
            Ok(self.0.iter().find(|u| u.id == id).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
            Ok(self.0.iter().find(|u| u.email == email).cloned())
        }

        async fn find_by_name(&self, name: &str) -> Result<Option<User>, RepoError> {
            Ok(self.0.iter().find(|u| u.name == name).cloned())
        }

        async fn find_by_email_prefix(&self, prefix: &str) -> Result<Option<User>, RepoError> {
            let wanted = format!("{prefix}@");
            Ok(self.0.iter().find(|u| u.email.starts_with(&wanted)).cloned())
        }

        async fn search(&self, _term: Option<&str>, _limit: u64) -> Result<Vec<User>, RepoError> {
            Ok(self.0.clone())
        }

        async fn save(&self, user: User) -> Result<User, RepoError> {
            Ok(user)
        }
    }

    fn known_users() -> FixedUsers {
        FixedUsers(vec![
            User::new("jane@x.com".into(), "Jane Park".into(), "h".into()),
            User::new("john.doe@lab.org".into(), "John Doe".into(), "h".into()),
        ])
    }

    #[tokio::test]
    async fn resolves_email_form_mentions() {
        let users = known_users();
        let mentions = resolve_mentions(&["jane@x.com".to_string()], &users)
            .await
            .unwrap();
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].mentioned_email, "jane@x.com");
        assert_eq!(mentions[0].mentioned_name.as_deref(), Some("Jane Park"));
    }

    #[tokio::test]
    async fn resolves_name_form_via_display_name() {
        let users = known_users();
        let mentions = resolve_mentions(&["John_Doe".to_string()], &users)
            .await
            .unwrap();
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].mentioned_email, "john.doe@lab.org");
    }

    #[tokio::test]
    async fn resolves_name_form_via_email_local_part() {
        let users = known_users();
        let mentions = resolve_mentions(&["jane".to_string()], &users).await.unwrap();
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].mentioned_email, "jane@x.com");
    }

    #[tokio::test]
    async fn unresolved_mentions_are_dropped() {
        let users = known_users();
        let mentions = resolve_mentions(
            &["ghost@nowhere.io".to_string(), "nobody".to_string()],
            &users,
        )
        .await
        .unwrap();
        assert!(mentions.is_empty());
    }

    #[tokio::test]
    async fn resolution_deduplicates_by_email() {
        let users = known_users();
        let mentions = resolve_mentions(
            &["jane@x.com".to_string(), "jane".to_string()],
            &users,
        )
        .await
        .unwrap();
        assert_eq!(mentions.len(), 1);
    }
}
