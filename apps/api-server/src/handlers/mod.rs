//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod posts;
mod tags;
mod users;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Community board routes
            .service(
                web::scope("/community")
                    .route("/posts", web::get().to(posts::list_posts))
                    .route("/posts", web::post().to(posts::create_post))
                    .route("/posts/{id}", web::get().to(posts::get_post))
                    .route("/posts/{id}", web::put().to(posts::update_post))
                    .route("/posts/{id}", web::delete().to(posts::delete_post))
                    .route("/posts/{id}/like", web::post().to(posts::toggle_like))
                    .route("/posts/{id}/comments", web::get().to(comments::list_comments))
                    .route(
                        "/posts/{id}/comments",
                        web::post().to(comments::create_comment),
                    )
                    .route("/popular-posts", web::get().to(posts::popular_posts))
                    .route("/mentioned-posts", web::get().to(posts::mentioned_posts))
                    .route("/tags", web::get().to(tags::list_tags))
                    .route("/users", web::get().to(users::search_users)),
            ),
    );
}
