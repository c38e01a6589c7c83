//! Popular-tags endpoint, served through the cache with a short TTL.

use std::time::Duration;

use actix_web::{HttpResponse, web};

use gflab_shared::dto::TagResponse;

use crate::middleware::error::AppResult;
use crate::state::AppState;

const TAGS_CACHE_KEY: &str = "community:tags";
const TAGS_CACHE_TTL: Duration = Duration::from_secs(60);
const TAG_LIST_LIMIT: u64 = 50;

/// GET /api/community/tags
pub async fn list_tags(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    if let Some(cached) = state.cache.get(TAGS_CACHE_KEY).await {
        if let Ok(tags) = serde_json::from_str::<Vec<TagResponse>>(&cached) {
            return Ok(HttpResponse::Ok().json(tags));
        }
    }

    let usages = state.tags.list(TAG_LIST_LIMIT).await?;
    let tags: Vec<TagResponse> = usages
        .into_iter()
        .map(|usage| TagResponse {
            id: usage.tag.id,
            name: usage.tag.name,
            post_count: usage.post_count,
        })
        .collect();

    match serde_json::to_string(&tags) {
        Ok(serialized) => {
            if let Err(e) = state
                .cache
                .set(TAGS_CACHE_KEY, &serialized, Some(TAGS_CACHE_TTL))
                .await
            {
                tracing::warn!("Failed to cache tag listing: {}", e);
            }
        }
        Err(e) => tracing::warn!("Failed to serialize tag listing: {}", e),
    }

    Ok(HttpResponse::Ok().json(tags))
}
