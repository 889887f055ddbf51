//! Integration tests for Rolodex.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory store, no external services needed
//! cargo test -p rolodex-integration-tests
//!
//! # Include the PostgreSQL-backed tests
//! ROLODEX_TEST_DATABASE_URL=postgres://localhost/rolodex_test \
//!     cargo test -p rolodex-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `users_api` - Black-box HTTP tests against a server on an ephemeral port
//! - `pg_user_store` - `PgUserStore` semantics against a real database

use rolodex_server::db::PgUserStore;
use rolodex_server::state::AppState;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// DDL for the `users` table, applied before database-backed tests.
pub const SCHEMA: &str = include_str!("../../server/schema.sql");

/// Environment variable naming the throwaway test database.
pub const TEST_DATABASE_URL_VAR: &str = "ROLODEX_TEST_DATABASE_URL";

/// A server running the production router on an ephemeral port.
///
/// The server task is aborted when this value is dropped.
pub struct TestServer {
    base_url: String,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Bind `127.0.0.1:0` and serve the router over `state`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn(state: AppState) -> Self {
        let app = rolodex_server::app(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener
            .local_addr()
            .expect("listener has no local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// An email address no other test run will produce.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4().simple())
}

/// Connect to the test database and make sure the `users` table exists.
///
/// # Panics
///
/// Panics if `ROLODEX_TEST_DATABASE_URL` is unset or the database is unreachable.
pub async fn postgres_store() -> PgUserStore {
    let url = std::env::var(TEST_DATABASE_URL_VAR)
        .unwrap_or_else(|_| panic!("{TEST_DATABASE_URL_VAR} must be set for database tests"));
    let pool = PgPool::connect(&url)
        .await
        .expect("failed to connect to test database");
    sqlx::raw_sql(SCHEMA)
        .execute(&pool)
        .await
        .expect("failed to apply schema");
    PgUserStore::new(pool)
}
