//! `PostgreSQL` user repository.
//!
//! Queries are checked at runtime (`sqlx::query_as` with bound parameters)
//! rather than with the compile-time macros, so building the crate does not
//! need a live database.

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use tracing::{debug, instrument};

use rolodex_core::{Email, NewUser, User, UserId};

use super::{RepositoryError, UserConnection, UserStore};

/// Raw `users` row as read from the database.
type UserRow = (UserId, String, String);

/// User store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn acquire(&self) -> Result<Box<dyn UserConnection>, RepositoryError> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(PgUserConnection { conn }))
    }
}

/// A pooled connection; returned to the pool on drop.
struct PgUserConnection {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl UserConnection for PgUserConnection {
    async fn ping(&mut self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&mut *self.conn).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_users(&mut self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r"
            SELECT id, name, email
            FROM users
            ORDER BY id
            ",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        let users = rows
            .into_iter()
            .map(into_user)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    #[instrument(skip(self, user), fields(name = %user.name))]
    async fn create_user(&mut self, user: &NewUser) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO users (name, email)
            VALUES ($1, $2)
            ",
        )
        .bind(&user.name)
        .bind(&user.email)
        .execute(&mut *self.conn)
        .await?;

        debug!("Inserted user");
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn get_user(&mut self, id: UserId) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, name, email
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map_or(Err(RepositoryError::NotFound), into_user)
    }

    #[instrument(skip(self, user), fields(user_id = %id))]
    async fn update_user(&mut self, id: UserId, user: &NewUser) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET name = $1, email = $2
            WHERE id = $3
            ",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        // Zero rows is still a success for the caller
        debug!(rows = result.rows_affected(), "Updated user");
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn delete_user(&mut self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        debug!(rows = result.rows_affected(), "Deleted user");
        Ok(())
    }
}

/// Convert a raw row, rejecting rows that break the entity invariant.
fn into_user((id, name, email): UserRow) -> Result<User, RepositoryError> {
    if name.is_empty() {
        return Err(RepositoryError::DataCorruption(format!(
            "empty name in database for user {id}"
        )));
    }

    let email = Email::parse(&email).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid email in database for user {id}: {e}"))
    })?;

    Ok(User { id, name, email })
}
