//! Database operations for the storefront `SQLite` store.
//!
//! # Database: `games.db`
//!
//! Everything is local; the catalog, cart, and order ledger share one file:
//!
//! ## Tables
//!
//! - `games` - Catalog
//! - `customers` - Site authentication
//! - `cart_items` - Per-user cart lines
//! - `purchases` / `purchase_items` - Immutable order ledger
//! - `user_games` - Library entitlements
//! - `comments` - Per-game reviews
//! - `schema_migrations` - Applied migration ledger
//! - `tower_sessions` - Session storage
//!
//! # Migrations
//!
//! Schema convergence runs at startup via [`migrations::ensure_schema`];
//! see that module for the ledger.

pub mod cart;
pub mod comments;
pub mod games;
pub mod migrations;
pub mod orders;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use cart::CartRepository;
pub use comments::CommentRepository;
pub use games::GameRepository;
pub use orders::OrderRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Entity exists but belongs to a different user.
    #[error("not the owner of this resource")]
    Forbidden,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// The database file is created if missing, WAL journaling is enabled, and
/// a busy timeout covers writer contention (`SQLite` serializes writers).
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Build an in-memory pool with the full schema applied.
///
/// A single connection keeps the `:memory:` database alive and shared
/// across the test.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    migrations::ensure_schema(&pool)
        .await
        .expect("schema bootstrap");
    pool
}
