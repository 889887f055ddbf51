//! In-memory user store.
//!
//! Mirrors the `PostgreSQL` semantics exactly: ids start at 1 and are never
//! reused, listing is ordered by id, and update/delete on a missing id succeed
//! without doing anything. Selected with `ROLODEX_STORE=memory` and used by
//! the handler tests, which also use the `unavailable()` and `failing()`
//! variants to reach the store error paths.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use rolodex_core::{NewUser, User, UserId};

use super::{RepositoryError, UserConnection, UserStore};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<UserId, User>,
    last_id: i32,
}

/// How the store answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Ready,
    Unavailable,
    Failing,
}

/// Process-local user store.
///
/// Clones share the same table.
#[derive(Debug, Clone)]
pub struct InMemoryUserStore {
    table: Arc<RwLock<Table>>,
    mode: Mode,
}

impl InMemoryUserStore {
    /// Create an empty, reachable store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mode(Mode::Ready)
    }

    /// Create a store whose `acquire` always fails, as an unreachable database would.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::with_mode(Mode::Unavailable)
    }

    /// Create a store that hands out connections on which every statement fails.
    #[must_use]
    pub fn failing() -> Self {
        Self::with_mode(Mode::Failing)
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            table: Arc::default(),
            mode,
        }
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    /// Whether the store holds no users.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn acquire(&self) -> Result<Box<dyn UserConnection>, RepositoryError> {
        if self.mode == Mode::Unavailable {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }

        Ok(Box::new(InMemoryConnection {
            table: Arc::clone(&self.table),
            failing: self.mode == Mode::Failing,
        }))
    }
}

struct InMemoryConnection {
    table: Arc<RwLock<Table>>,
    failing: bool,
}

impl InMemoryConnection {
    fn check(&self) -> Result<(), RepositoryError> {
        if self.failing {
            return Err(RepositoryError::Database(sqlx::Error::Protocol(
                "statement failed".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl UserConnection for InMemoryConnection {
    async fn ping(&mut self) -> Result<(), RepositoryError> {
        self.check()
    }

    async fn list_users(&mut self) -> Result<Vec<User>, RepositoryError> {
        self.check()?;
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn create_user(&mut self, user: &NewUser) -> Result<(), RepositoryError> {
        self.check()?;
        let mut table = self.table.write().await;
        table.last_id = table
            .last_id
            .checked_add(1)
            .ok_or_else(|| RepositoryError::DataCorruption("id space exhausted".to_string()))?;
        let id = UserId::new(table.last_id);
        table.rows.insert(id, user.clone().with_id(id));
        Ok(())
    }

    async fn get_user(&mut self, id: UserId) -> Result<User, RepositoryError> {
        self.check()?;
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn update_user(&mut self, id: UserId, user: &NewUser) -> Result<(), RepositoryError> {
        self.check()?;
        if let Some(row) = self.table.write().await.rows.get_mut(&id) {
            row.name.clone_from(&user.name);
            row.email = user.email.clone();
        }
        Ok(())
    }

    async fn delete_user(&mut self, id: UserId) -> Result<(), RepositoryError> {
        self.check()?;
        self.table.write().await.rows.remove(&id);
        Ok(())
    }
}
