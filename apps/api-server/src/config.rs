//! Application configuration loaded from environment variables.

use std::env;

use gflab_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub admin: Option<AdminBootstrap>,
}

/// Admin account seeded at startup when configured.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        });

        let admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(AdminBootstrap {
                email,
                name: env::var("ADMIN_NAME")
                    .unwrap_or_else(|_| "Global Partnership Center".to_string()),
                password,
            }),
            _ => None,
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database,
            admin,
        }
    }
}
