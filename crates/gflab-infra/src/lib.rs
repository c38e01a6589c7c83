//! # GFLab Infrastructure
//!
//! Concrete implementations of the ports defined in `gflab-core`.
//! This crate contains the board stores (PostgreSQL via SeaORM and a fully
//! functional in-memory fallback), authentication, caching, and rate
//! limiting.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory store only
//! - `postgres` - PostgreSQL board store via SeaORM
//! - `rate-limit` - Rate limiting via governor

pub mod auth;
pub mod cache;
pub mod database;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use database::memory::InMemoryBoard;
pub use database::DatabaseConnections;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};

// Re-exports - Postgres
#[cfg(feature = "postgres")]
pub use database::postgres::{
    PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
    PostgresUserRepository,
};
