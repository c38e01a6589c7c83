//! Application state - shared across all handlers.

use std::sync::Arc;

use gflab_core::domain::User;
use gflab_core::ports::{
    Cache, CommentRepository, PasswordService, PostRepository, TagRepository, UserRepository,
};
use gflab_infra::database::{DatabaseConfig, DatabaseConnections};
use gflab_infra::{InMemoryBoard, InMemoryCache};

#[cfg(feature = "postgres")]
use gflab_infra::{
    PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
    PostgresUserRepository,
};

use crate::config::AdminBootstrap;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub cache: Arc<dyn Cache>,
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(config) = db_config {
                match DatabaseConnections::init(config).await {
                    Ok(connections) => {
                        let conn = Arc::new(connections);
                        let state = Self {
                            users: Arc::new(PostgresUserRepository::new(conn.main.clone())),
                            posts: Arc::new(PostgresPostRepository::new(conn.main.clone())),
                            comments: Arc::new(PostgresCommentRepository::new(conn.main.clone())),
                            tags: Arc::new(PostgresTagRepository::new(conn.main.clone())),
                            cache: Arc::new(InMemoryCache::new()),
                            db: Some(conn),
                        };
                        tracing::info!("Application state initialized (postgres)");
                        return state;
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory board.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running with the in-memory board.");
            }
        }

        #[cfg(not(feature = "postgres"))]
        {
            let _ = db_config;
            tracing::info!("Running without postgres feature - using the in-memory board");
        }

        Self::in_memory()
    }

    /// State backed entirely by the in-memory board. Also the substrate
    /// for the HTTP integration tests.
    pub fn in_memory() -> Self {
        let board = InMemoryBoard::new();
        Self {
            users: board.clone(),
            posts: board.clone(),
            comments: board.clone(),
            tags: board,
            cache: Arc::new(InMemoryCache::new()),
            db: None,
        }
    }

    /// Seed the configured admin account if it does not exist yet, and
    /// make sure an existing account carries the admin flag.
    pub async fn ensure_admin(
        &self,
        admin: &AdminBootstrap,
        passwords: &dyn PasswordService,
    ) -> Result<(), String> {
        match self
            .users
            .find_by_email(&admin.email)
            .await
            .map_err(|e| e.to_string())?
        {
            Some(mut user) => {
                if !user.is_admin {
                    user.is_admin = true;
                    self.users.save(user).await.map_err(|e| e.to_string())?;
                    tracing::info!("Promoted existing account to admin");
                }
            }
            None => {
                let hash = passwords
                    .hash(&admin.password)
                    .map_err(|e| e.to_string())?;
                let mut user = User::new(admin.email.clone(), admin.name.clone(), hash);
                user.is_admin = true;
                self.users.save(user).await.map_err(|e| e.to_string())?;
                tracing::info!("Seeded admin account");
            }
        }
        Ok(())
    }
}
