//! User search for mention autocomplete.

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use gflab_shared::dto::UserSummary;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserSearchParams {
    pub search: Option<String>,
    pub limit: Option<u64>,
}

/// GET /api/community/users
pub async fn search_users(
    state: web::Data<AppState>,
    params: web::Query<UserSearchParams>,
) -> AppResult<HttpResponse> {
    let params = params.into_inner();

    let limit = params.limit.unwrap_or(20);
    if !(1..=100).contains(&limit) {
        return Err(AppError::BadRequest(
            "limit must be between 1 and 100".to_string(),
        ));
    }

    let users = state
        .users
        .search(params.search.as_deref().filter(|s| !s.is_empty()), limit)
        .await?;

    let summaries: Vec<UserSummary> = users
        .into_iter()
        .map(|user| UserSummary {
            email: user.email,
            name: user.name,
            picture: user.picture,
        })
        .collect();
    Ok(HttpResponse::Ok().json(summaries))
}
