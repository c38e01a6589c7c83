//! HTTP-level tests for the community board API, driven against the
//! in-memory board through the real router, extractors and error
//! middleware.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, Error, test, web};
use std::sync::Arc;

use api_server::config::AdminBootstrap;
use api_server::handlers;
use api_server::state::AppState;
use gflab_core::ports::{PasswordService, TokenService};
use gflab_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};
use gflab_shared::dto::{
    AuthResponse, CommentResponse, LikeResponse, PostListResponse, PostResponse, TagResponse,
    UserResponse, UserSummary,
};

const ADMIN_EMAIL: &str = "admin@gflab.org";
const PASSWORD: &str = "a-strong-password";

async fn spawn_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
        secret: "test-secret".to_string(),
        expiration_hours: 1,
        issuer: "gflab-test".to_string(),
    }));
    let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(web::Data::new(token_service))
            .app_data(web::Data::new(password_service))
            .configure(handlers::configure_routes),
    )
    .await
}

async fn seed_admin(state: &AppState) {
    state
        .ensure_admin(
            &AdminBootstrap {
                email: ADMIN_EMAIL.to_string(),
                name: "Partnership Center".to_string(),
                password: PASSWORD.to_string(),
            },
            &Argon2PasswordService::new(),
        )
        .await
        .expect("admin bootstrap");
}

async fn register<S, B>(app: &S, email: &str, name: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let resp: AuthResponse = test::call_and_read_body_json(
        app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(serde_json::json!({
                "email": email,
                "name": name,
                "password": PASSWORD,
            }))
            .to_request(),
    )
    .await;
    resp.access_token
}

async fn login<S, B>(app: &S, email: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let resp: AuthResponse = test::call_and_read_body_json(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({
                "email": email,
                "password": PASSWORD,
            }))
            .to_request(),
    )
    .await;
    resp.access_token
}

async fn create_post<S, B>(app: &S, token: &str, body: serde_json::Value) -> PostResponse
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    test::call_and_read_body_json(
        app,
        test::TestRequest::post()
            .uri("/api/community/posts")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(body)
            .to_request(),
    )
    .await
}

fn forum_post(title: &str, content: &str) -> serde_json::Value {
    serde_json::json!({
        "post_type": "forum",
        "title": title,
        "content": content,
    })
}

#[actix_web::test]
async fn health_endpoint_reports_ok() {
    let app = spawn_app(AppState::in_memory()).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/health").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn register_login_me_flow() {
    let app = spawn_app(AppState::in_memory()).await;

    register(&app, "jane@x.com", "Jane Park").await;
    let token = login(&app, "jane@x.com").await;

    let me: UserResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request(),
    )
    .await;
    assert_eq!(me.email, "jane@x.com");
    assert_eq!(me.name, "Jane Park");
}

#[actix_web::test]
async fn missing_token_is_unauthorized() {
    let app = spawn_app(AppState::in_memory()).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/community/posts")
            .set_json(forum_post("Hello", "world"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn creating_a_post_extracts_tags_and_resolves_mentions() {
    let app = spawn_app(AppState::in_memory()).await;

    register(&app, "jane@x.com", "Jane Park").await;
    let token = register(&app, "author@gflab.org", "Author").await;

    let post = create_post(
        &app,
        &token,
        forum_post("Hello", "Check #news and @jane@x.com, also @ghost@nowhere.io"),
    )
    .await;

    let tag_names: Vec<&str> = post.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tag_names, vec!["news"]);
    // Known identity resolves, unknown one is dropped.
    assert_eq!(post.mentions.len(), 1);
    assert_eq!(post.mentions[0].mentioned_email, "jane@x.com");
    assert_eq!(post.mentions[0].mentioned_name.as_deref(), Some("Jane Park"));
    assert_eq!(post.comment_count, 0);
}

#[actix_web::test]
async fn non_admin_cannot_create_notice() {
    let app = spawn_app(AppState::in_memory()).await;
    let token = register(&app, "user@gflab.org", "User").await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/community/posts")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(serde_json::json!({
                "post_type": "notice",
                "title": "Announcement",
                "content": "hello",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admin_notice_is_pinned_and_displayed_under_center_byline() {
    let state = AppState::in_memory();
    seed_admin(&state).await;
    let app = spawn_app(state).await;

    let admin_token = login(&app, ADMIN_EMAIL).await;
    let notice = create_post(
        &app,
        &admin_token,
        serde_json::json!({
            "post_type": "notice",
            "title": "Welcome",
            "content": "Opening week",
        }),
    )
    .await;
    assert_eq!(notice.author_name, "Global Partnership Center");

    // Pin it, then post a newer forum post; the pinned notice still
    // sorts first.
    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/community/posts/{}", notice.id))
            .insert_header(("Authorization", format!("Bearer {admin_token}")))
            .set_json(serde_json::json!({ "is_pinned": true }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let user_token = register(&app, "user@gflab.org", "User").await;
    create_post(&app, &user_token, forum_post("newer", "content")).await;

    let listing: PostListResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/community/posts")
            .to_request(),
    )
    .await;
    assert_eq!(listing.total, 2);
    assert_eq!(listing.posts[0].title, "Welcome");
    assert!(listing.posts[0].is_pinned);
}

#[actix_web::test]
async fn blank_title_is_rejected() {
    let app = spawn_app(AppState::in_memory()).await;
    let token = register(&app, "user@gflab.org", "User").await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/community/posts")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(forum_post("   ", "content"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn invalid_pagination_is_rejected() {
    let app = spawn_app(AppState::in_memory()).await;

    for uri in [
        "/api/community/posts?page=0",
        "/api/community/posts?page_size=0",
        "/api/community/posts?page_size=101",
    ] {
        let resp =
            test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[actix_web::test]
async fn paging_beyond_the_last_page_keeps_the_true_total() {
    let app = spawn_app(AppState::in_memory()).await;
    let token = register(&app, "user@gflab.org", "User").await;

    for i in 0..3 {
        create_post(&app, &token, forum_post(&format!("post {i}"), "content")).await;
    }

    let listing: PostListResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/community/posts?page=5&page_size=2")
            .to_request(),
    )
    .await;
    assert!(listing.posts.is_empty());
    assert_eq!(listing.total, 3);
}

#[actix_web::test]
async fn detail_fetch_increments_view_count_each_time() {
    let app = spawn_app(AppState::in_memory()).await;
    let token = register(&app, "user@gflab.org", "User").await;
    let post = create_post(&app, &token, forum_post("viewed", "content")).await;

    let mut last = None;
    for _ in 0..3 {
        let detail: PostResponse = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/community/posts/{}", post.id))
                .to_request(),
        )
        .await;
        last = Some(detail.view_count);
    }
    assert_eq!(last, Some(3));
}

#[actix_web::test]
async fn like_toggle_round_trips_with_query_parameter_token() {
    let app = spawn_app(AppState::in_memory()).await;
    let token = register(&app, "user@gflab.org", "User").await;
    let post = create_post(&app, &token, forum_post("likeable", "content")).await;

    // The web client passes the token as a query parameter.
    let uri = format!("/api/community/posts/{}/like?token={token}", post.id);

    let liked: LikeResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::post().uri(&uri).to_request(),
    )
    .await;
    assert!(liked.liked);
    assert_eq!(liked.like_count, 1);

    let unliked: LikeResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::post().uri(&uri).to_request(),
    )
    .await;
    assert!(!unliked.liked);
    assert_eq!(unliked.like_count, 0);
}

#[actix_web::test]
async fn reply_to_a_comment_on_another_post_is_rejected() {
    let app = spawn_app(AppState::in_memory()).await;
    let token = register(&app, "user@gflab.org", "User").await;
    let first = create_post(&app, &token, forum_post("first", "content")).await;
    let second = create_post(&app, &token, forum_post("second", "content")).await;

    let parent: CommentResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/community/posts/{}/comments", first.id))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(serde_json::json!({ "content": "top level" }))
            .to_request(),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/community/posts/{}/comments", second.id))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(serde_json::json!({
                "content": "reply in the wrong thread",
                "parent_id": parent.id,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn deleting_a_post_takes_its_comment_thread_with_it() {
    let app = spawn_app(AppState::in_memory()).await;
    let token = register(&app, "user@gflab.org", "User").await;
    let post = create_post(&app, &token, forum_post("doomed", "content")).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/community/posts/{}/comments", post.id))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(serde_json::json!({ "content": "soon gone" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/community/posts/{}", post.id))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/community/posts/{}/comments", post.id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn only_the_author_may_update_a_forum_post() {
    let app = spawn_app(AppState::in_memory()).await;
    let author_token = register(&app, "author@gflab.org", "Author").await;
    let other_token = register(&app, "other@gflab.org", "Other").await;
    let post = create_post(&app, &author_token, forum_post("mine", "content")).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/community/posts/{}", post.id))
            .insert_header(("Authorization", format!("Bearer {other_token}")))
            .set_json(serde_json::json!({ "title": "hijacked" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn editing_content_alone_does_not_rederive_tags() {
    let app = spawn_app(AppState::in_memory()).await;
    let token = register(&app, "user@gflab.org", "User").await;
    let post = create_post(&app, &token, forum_post("tagged", "about #news")).await;

    let updated: PostResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/community/posts/{}", post.id))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(serde_json::json!({ "content": "now about #other things" }))
            .to_request(),
    )
    .await;
    let tag_names: Vec<&str> = updated.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tag_names, vec!["news"]);

    // Supplying tags explicitly replaces the stored set.
    let updated: PostResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/community/posts/{}", post.id))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(serde_json::json!({ "tags": ["Fresh"] }))
            .to_request(),
    )
    .await;
    let tag_names: Vec<&str> = updated.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tag_names, vec!["fresh"]);
}

#[actix_web::test]
async fn is_resolved_only_applies_to_request_posts() {
    let app = spawn_app(AppState::in_memory()).await;
    let token = register(&app, "user@gflab.org", "User").await;

    let forum = create_post(&app, &token, forum_post("not a request", "content")).await;
    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/community/posts/{}", forum.id))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(serde_json::json!({ "is_resolved": true }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let request = create_post(
        &app,
        &token,
        serde_json::json!({
            "post_type": "request",
            "title": "Need a projector",
            "content": "Anyone?",
        }),
    )
    .await;
    let resolved: PostResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/community/posts/{}", request.id))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(serde_json::json!({ "is_resolved": true }))
            .to_request(),
    )
    .await;
    assert!(resolved.is_resolved);
}

#[actix_web::test]
async fn mentioned_posts_deduplicate_by_post() {
    let app = spawn_app(AppState::in_memory()).await;
    let jane_token = register(&app, "jane@x.com", "Jane Park").await;
    let author_token = register(&app, "author@gflab.org", "Author").await;

    let post = create_post(
        &app,
        &author_token,
        forum_post("ping", "hello @jane@x.com"),
    )
    .await;
    // Mention her again in a comment on the same post.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/community/posts/{}/comments", post.id))
            .insert_header(("Authorization", format!("Bearer {author_token}")))
            .set_json(serde_json::json!({ "content": "again @jane@x.com" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let mentioned: PostListResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/community/mentioned-posts?token={jane_token}"))
            .to_request(),
    )
    .await;
    assert_eq!(mentioned.total, 1);
    assert_eq!(mentioned.posts.len(), 1);
    assert_eq!(mentioned.posts[0].id, post.id);
}

#[actix_web::test]
async fn tag_listing_counts_live_associations() {
    let app = spawn_app(AppState::in_memory()).await;
    let token = register(&app, "user@gflab.org", "User").await;

    create_post(&app, &token, forum_post("one", "about #rust")).await;
    create_post(&app, &token, forum_post("two", "more #rust and #actix")).await;

    let tags: Vec<TagResponse> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/community/tags")
            .to_request(),
    )
    .await;
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].name, "rust");
    assert_eq!(tags[0].post_count, 2);
    assert_eq!(tags[1].name, "actix");
    assert_eq!(tags[1].post_count, 1);
}

#[actix_web::test]
async fn popular_posts_rank_forum_posts_by_likes() {
    let app = spawn_app(AppState::in_memory()).await;
    let token = register(&app, "user@gflab.org", "User").await;
    let fan_token = register(&app, "fan@gflab.org", "Fan").await;

    let quiet = create_post(&app, &token, forum_post("quiet", "content")).await;
    let loved = create_post(&app, &token, forum_post("loved", "content")).await;

    for t in [&token, &fan_token] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/community/posts/{}/like?token={t}", loved.id))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let popular: Vec<PostResponse> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/community/popular-posts?limit=2")
            .to_request(),
    )
    .await;
    assert_eq!(popular.len(), 2);
    assert_eq!(popular[0].id, loved.id);
    assert_eq!(popular[1].id, quiet.id);
}

#[actix_web::test]
async fn user_search_returns_autocomplete_summaries() {
    let app = spawn_app(AppState::in_memory()).await;
    register(&app, "jane@x.com", "Jane Park").await;
    register(&app, "john.doe@gflab.org", "John Doe").await;

    let hits: Vec<UserSummary> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/community/users?search=jane")
            .to_request(),
    )
    .await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].email, "jane@x.com");
    assert_eq!(hits[0].name, "Jane Park");
}
