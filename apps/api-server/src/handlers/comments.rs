//! Comment thread handlers.
//!
//! The service returns comments as a flat list in creation order; the
//! client groups top-level comments and replies into the 2-level display.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use gflab_core::content::extract;
use gflab_core::domain::{Comment, CommentView};
use gflab_core::ports::NewComment;
use gflab_shared::dto::{CommentResponse, CreateCommentRequest, MentionResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn to_comment_response(view: CommentView) -> CommentResponse {
    let CommentView { comment, mentions } = view;
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        content: comment.content,
        author_email: comment.author_email,
        author_name: comment.author_name,
        parent_id: comment.parent_id,
        mentions: mentions
            .into_iter()
            .map(|m| MentionResponse {
                mentioned_email: m.mentioned_email,
                mentioned_name: m.mentioned_name,
            })
            .collect(),
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }
}

/// GET /api/community/posts/{id}/comments
pub async fn list_comments(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    if state.posts.find(post_id).await?.is_none() {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let comments = state.comments.list_for_post(post_id).await?;
    let responses: Vec<CommentResponse> = comments.into_iter().map(to_comment_response).collect();
    Ok(HttpResponse::Ok().json(responses))
}

/// POST /api/community/posts/{id}/comments
pub async fn create_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let req = body.into_inner();

    if state.posts.find(post_id).await?.is_none() {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or(AppError::Unauthorized)?;

    let content = req.content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest(
            "content must not be empty".to_string(),
        ));
    }

    // A reply must point at a comment on the same post.
    if let Some(parent_id) = req.parent_id {
        match state.comments.find(parent_id).await? {
            Some(parent) if parent.post_id == post_id => {}
            _ => {
                return Err(AppError::NotFound(
                    "Parent comment not found on this post".to_string(),
                ));
            }
        }
    }

    let tokens = extract::collect_mention_tokens(&req.mentions, content);
    let mentions = extract::resolve_mentions(&tokens, state.users.as_ref()).await?;

    let comment = Comment::new(
        post_id,
        content.to_string(),
        user.id,
        user.email.clone(),
        user.name.clone(),
        req.parent_id,
    );
    let view = state.comments.create(NewComment { comment, mentions }).await?;
    tracing::info!(post_id = %post_id, comment_id = %view.comment.id, "Created comment");

    Ok(HttpResponse::Created().json(to_comment_response(view)))
}
