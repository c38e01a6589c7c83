//! Main entry point for the community API server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use api_server::config::AppConfig;
use api_server::handlers;
use api_server::observability::RequestIdMiddleware;
use api_server::state::AppState;
use api_server::telemetry::{TelemetryConfig, init_telemetry};
use gflab_core::ports::{PasswordService, TokenService};
use gflab_infra::{Argon2PasswordService, JwtTokenService};

#[cfg(feature = "rate-limit")]
use api_server::middleware::rate_limit::RateLimitMiddleware;
#[cfg(feature = "rate-limit")]
use gflab_core::ports::RateLimiter;
#[cfg(feature = "rate-limit")]
use gflab_infra::InMemoryRateLimiter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting community API server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(config.database.as_ref()).await;

    let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());
    let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

    if let Some(admin) = &config.admin {
        if let Err(e) = state.ensure_admin(admin, password_service.as_ref()).await {
            tracing::error!("Failed to bootstrap admin account: {}", e);
        }
    }

    #[cfg(feature = "rate-limit")]
    let limiter: Arc<dyn RateLimiter> = Arc::new(InMemoryRateLimiter::from_env());

    HttpServer::new(move || {
        let app = App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(token_service.clone()))
            .app_data(web::Data::new(password_service.clone()))
            .configure(handlers::configure_routes);

        #[cfg(feature = "rate-limit")]
        let app = app.wrap(RateLimitMiddleware::new(limiter.clone()));

        app
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
