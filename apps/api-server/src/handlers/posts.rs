//! Board post handlers: listing, detail, mutation, likes, and the
//! mention reverse-index.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use gflab_core::content::extract;
use gflab_core::domain::{Post, PostType, PostView};
use gflab_core::ports::{NewPost, PostPatch, PostQuery};
use gflab_shared::ApiResponse;
use gflab_shared::dto::{
    CreatePostRequest, LikeResponse, ListPostsParams, MentionResponse, PostListResponse,
    PostResponse, TagRef, UpdatePostRequest,
};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Notices always display under the partnership-center byline, whoever
/// the authoring admin account was.
pub(crate) const NOTICE_AUTHOR_DISPLAY: &str = "Global Partnership Center";

pub(crate) fn to_post_response(view: PostView) -> PostResponse {
    let PostView {
        post,
        like_count,
        is_liked,
        comment_count,
        tags,
        mentions,
    } = view;

    let author_name = if post.post_type == PostType::Notice {
        NOTICE_AUTHOR_DISPLAY.to_string()
    } else {
        post.author_name
    };

    PostResponse {
        id: post.id,
        post_type: post.post_type.to_string(),
        title: post.title,
        content: post.content,
        author_email: post.author_email,
        author_name,
        is_pinned: post.is_pinned,
        is_resolved: post.is_resolved,
        view_count: post.view_count,
        image_url: post.image_url,
        like_count,
        is_liked,
        comment_count,
        tags: tags
            .into_iter()
            .map(|t| TagRef {
                id: t.id,
                name: t.name,
            })
            .collect(),
        mentions: mentions
            .into_iter()
            .map(|m| MentionResponse {
                mentioned_email: m.mentioned_email,
                mentioned_name: m.mentioned_name,
            })
            .collect(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Post not found".to_string())
}

/// GET /api/community/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    params: web::Query<ListPostsParams>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let params = params.into_inner();

    let post_type = match params.post_type.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<PostType>().map_err(AppError::from)?),
        None => None,
    };

    let query = PostQuery {
        post_type,
        tag: params.tag.filter(|s| !s.is_empty()),
        search: params.search.filter(|s| !s.is_empty()),
        page: params.page.unwrap_or(1),
        page_size: params.page_size.unwrap_or(20),
    };
    query.validate()?;

    let viewer = viewer.0.map(|identity| identity.viewer());
    let page = state.posts.page(&query, viewer.as_ref()).await?;

    Ok(HttpResponse::Ok().json(PostListResponse {
        posts: page.posts.into_iter().map(to_post_response).collect(),
        total: page.total,
        page: query.page,
        page_size: query.page_size,
    }))
}

/// GET /api/community/posts/{id}
///
/// Every detail fetch counts as a view; there is no dedup window for
/// repeat viewers.
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    if !state.posts.record_view(post_id).await? {
        return Err(not_found());
    }

    let viewer = viewer.0.map(|identity| identity.viewer());
    let view = state
        .posts
        .detail(post_id, viewer.as_ref())
        .await?
        .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(to_post_response(view)))
}

/// POST /api/community/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or(AppError::Unauthorized)?;

    let post_type: PostType = req.post_type.parse().map_err(AppError::from)?;
    if post_type == PostType::Notice && !identity.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can create notice posts".to_string(),
        ));
    }

    let title = req.title.trim();
    let content = req.content.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("title must not be empty".to_string()));
    }
    if content.is_empty() {
        return Err(AppError::BadRequest(
            "content must not be empty".to_string(),
        ));
    }

    // Tags and mentions are the union of the supplied lists and what the
    // content itself carries; unresolved mentions are dropped.
    let tags = extract::collect_tags(&req.tags, content);
    let tokens = extract::collect_mention_tokens(&req.mentions, content);
    let mentions = extract::resolve_mentions(&tokens, state.users.as_ref()).await?;

    let author_name = if post_type == PostType::Notice {
        NOTICE_AUTHOR_DISPLAY.to_string()
    } else {
        user.name.clone()
    };
    let mut post = Post::new(
        post_type,
        title.to_string(),
        content.to_string(),
        user.id,
        user.email.clone(),
        author_name,
    );
    post.image_url = req.image_url;

    let view = state.posts.create(NewPost {
        post,
        tags,
        mentions,
    })
    .await?;
    tracing::info!(post_id = %view.post.id, post_type = %view.post.post_type, "Created post");

    Ok(HttpResponse::Created().json(to_post_response(view)))
}

/// PUT /api/community/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let req = body.into_inner();

    let post = state.posts.find(post_id).await?.ok_or_else(not_found)?;

    let is_author = post.author_id == identity.user_id;
    let admin_override = post.post_type == PostType::Notice && identity.is_admin();
    if !is_author && !admin_override {
        return Err(AppError::Forbidden(
            "Not authorized to update this post".to_string(),
        ));
    }

    let mut patch = PostPatch::default();

    if let Some(title) = req.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::BadRequest("title must not be empty".to_string()));
        }
        patch.title = Some(title);
    }
    if let Some(content) = req.content {
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(AppError::BadRequest(
                "content must not be empty".to_string(),
            ));
        }
        patch.content = Some(content);
    }
    if let Some(is_pinned) = req.is_pinned {
        if post.post_type != PostType::Notice {
            return Err(AppError::BadRequest(
                "is_pinned only applies to notice posts".to_string(),
            ));
        }
        if !identity.is_admin() {
            return Err(AppError::Forbidden(
                "Only admins can pin notices".to_string(),
            ));
        }
        patch.is_pinned = Some(is_pinned);
    }
    if let Some(is_resolved) = req.is_resolved {
        if post.post_type != PostType::Request {
            return Err(AppError::BadRequest(
                "is_resolved only applies to request posts".to_string(),
            ));
        }
        patch.is_resolved = Some(is_resolved);
    }

    // Tags and mentions change only when supplied; editing content alone
    // never re-derives them.
    if let Some(tags) = req.tags {
        patch.tags = Some(extract::collect_tags(&tags, ""));
    }
    if let Some(mentions) = req.mentions {
        let tokens = extract::collect_mention_tokens(&mentions, "");
        patch.mentions = Some(extract::resolve_mentions(&tokens, state.users.as_ref()).await?);
    }

    state.posts.update(post_id, patch).await?;

    let view = state
        .posts
        .detail(post_id, Some(&identity.viewer()))
        .await?
        .ok_or_else(not_found)?;
    tracing::info!(post_id = %post_id, "Updated post");

    Ok(HttpResponse::Ok().json(to_post_response(view)))
}

/// DELETE /api/community/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let post = state.posts.find(post_id).await?.ok_or_else(not_found)?;
    if post.author_id != identity.user_id && !identity.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to delete this post".to_string(),
        ));
    }

    state.posts.delete(post_id).await?;
    tracing::info!(post_id = %post_id, "Deleted post");

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message((), "Post deleted successfully")))
}

/// POST /api/community/posts/{id}/like
pub async fn toggle_like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let status = state
        .posts
        .toggle_like(path.into_inner(), identity.user_id)
        .await?;

    Ok(HttpResponse::Ok().json(LikeResponse {
        liked: status.liked,
        like_count: status.like_count,
    }))
}

#[derive(Debug, Deserialize)]
pub struct PopularPostsParams {
    pub limit: Option<u64>,
}

/// GET /api/community/popular-posts
pub async fn popular_posts(
    state: web::Data<AppState>,
    params: web::Query<PopularPostsParams>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let limit = params.limit.unwrap_or(3);
    if !(1..=20).contains(&limit) {
        return Err(AppError::BadRequest(
            "limit must be between 1 and 20".to_string(),
        ));
    }

    let viewer = viewer.0.map(|identity| identity.viewer());
    let views = state.posts.popular(limit, viewer.as_ref()).await?;

    let responses: Vec<PostResponse> = views.into_iter().map(to_post_response).collect();
    Ok(HttpResponse::Ok().json(responses))
}

#[derive(Debug, Deserialize)]
pub struct MentionedPostsParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// GET /api/community/mentioned-posts
pub async fn mentioned_posts(
    state: web::Data<AppState>,
    identity: Identity,
    params: web::Query<MentionedPostsParams>,
) -> AppResult<HttpResponse> {
    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(20);
    PostQuery {
        page,
        page_size,
        ..Default::default()
    }
    .validate()?;

    let viewer = identity.viewer();
    let result = state
        .posts
        .mentioned(&identity.email, page, page_size, Some(&viewer))
        .await?;

    Ok(HttpResponse::Ok().json(PostListResponse {
        posts: result.posts.into_iter().map(to_post_response).collect(),
        total: result.total,
        page,
        page_size,
    }))
}
