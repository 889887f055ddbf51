//! Data access for the `users` table.
//!
//! # Table
//!
//! ```sql
//! users(id SERIAL PRIMARY KEY, name TEXT NOT NULL, email TEXT NOT NULL)
//! ```
//!
//! The DDL lives in `crates/server/schema.sql`. The server never creates or
//! alters the table itself.
//!
//! # Store handles
//!
//! Handlers never see a pool. They receive a [`UserStore`] and ask it for a
//! [`UserConnection`] per request; dropping the connection releases it, so a
//! handler returning early on any path gives the connection back.
//!
//! - [`PgUserStore`] - `PostgreSQL` via sqlx
//! - [`InMemoryUserStore`] - process-local map with the same semantics

pub mod memory;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use rolodex_core::{NewUser, User, UserId};

use crate::config::DatabaseConfig;

pub use memory::InMemoryUserStore;
pub use users::PgUserStore;

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
}

/// Source of per-request connections to the user table.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Obtain a connection scoped to the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be reached.
    async fn acquire(&self) -> Result<Box<dyn UserConnection>, RepositoryError>;
}

/// The CRUD statements, issued over one acquired connection.
///
/// Every statement is single and non-transactional.
#[async_trait]
pub trait UserConnection: Send {
    /// Round-trip a trivial statement to prove the connection is live.
    async fn ping(&mut self) -> Result<(), RepositoryError>;

    /// All users, ordered by id. Empty when the table is empty.
    async fn list_users(&mut self) -> Result<Vec<User>, RepositoryError>;

    /// Insert a user. The store assigns the id, which is not reported back.
    async fn create_user(&mut self, user: &NewUser) -> Result<(), RepositoryError>;

    /// Fetch one user, or `RepositoryError::NotFound`.
    async fn get_user(&mut self, id: UserId) -> Result<User, RepositoryError>;

    /// Replace name and email by id. Succeeds even when no row matches.
    async fn update_user(&mut self, id: UserId, user: &NewUser) -> Result<(), RepositoryError>;

    /// Delete by id. Succeeds even when no row matches.
    async fn delete_user(&mut self, id: UserId) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool.
///
/// The pool connects lazily: an unreachable database surfaces as an
/// `acquire` failure on the first request rather than at startup.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection settings cannot be parsed.
pub fn create_pool(database: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    Ok(PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect_lazy_with(database.connect_options()?))
}
