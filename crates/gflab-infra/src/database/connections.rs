use std::time::Duration;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

/// Configuration for the board database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Database connection manager.
#[cfg(feature = "postgres")]
pub struct DatabaseConnections {
    pub main: DbConn,
}

#[cfg(not(feature = "postgres"))]
pub struct DatabaseConnections;

#[cfg(feature = "postgres")]
impl DatabaseConnections {
    /// Initialize the database connection pool from configuration.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DbErr> {
        tracing::info!("Initializing database connection...");

        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(true)
            .to_owned();

        let main = Database::connect(opts).await?;
        tracing::info!("Database connected (pool: {})", config.max_connections);

        Ok(Self { main })
    }
}
