//! `PgUserStore` tests against a real `PostgreSQL` database.
//!
//! All tests are ignored unless `ROLODEX_TEST_DATABASE_URL` is provided:
//!
//! ```bash
//! ROLODEX_TEST_DATABASE_URL=postgres://localhost/rolodex_test \
//!     cargo test -p rolodex-integration-tests --test pg_user_store -- --ignored
//! ```

use rolodex_core::{Email, NewUser, User, UserId};
use rolodex_integration_tests::{postgres_store, unique_email};
use rolodex_server::db::{RepositoryError, UserConnection, UserStore};

fn new_user(name: &str) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: Email::parse(&unique_email(name)).unwrap(),
    }
}

/// Insert `user` and return the stored row, found by its unique email.
async fn insert(conn: &mut dyn UserConnection, user: &NewUser) -> User {
    conn.create_user(user).await.unwrap();
    conn.list_users()
        .await
        .unwrap()
        .into_iter()
        .find(|u| u.email == user.email)
        .expect("inserted user missing from list")
}

#[tokio::test]
#[ignore = "Requires ROLODEX_TEST_DATABASE_URL"]
async fn test_ping() {
    let store = postgres_store().await;
    let mut conn = store.acquire().await.unwrap();
    conn.ping().await.unwrap();
}

#[tokio::test]
#[ignore = "Requires ROLODEX_TEST_DATABASE_URL"]
async fn test_create_get_round_trip() {
    let store = postgres_store().await;
    let mut conn = store.acquire().await.unwrap();

    let input = new_user("ann");
    let stored = insert(conn.as_mut(), &input).await;
    assert_eq!(stored.name, "ann");

    let fetched = conn.get_user(stored.id).await.unwrap();
    assert_eq!(fetched, stored);
}

#[tokio::test]
#[ignore = "Requires ROLODEX_TEST_DATABASE_URL"]
async fn test_list_is_ordered_by_id() {
    let store = postgres_store().await;
    let mut conn = store.acquire().await.unwrap();

    let first = insert(conn.as_mut(), &new_user("first")).await;
    let second = insert(conn.as_mut(), &new_user("second")).await;
    assert!(first.id < second.id);

    let ids: Vec<UserId> = conn
        .list_users()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
#[ignore = "Requires ROLODEX_TEST_DATABASE_URL"]
async fn test_update_replaces_both_fields() {
    let store = postgres_store().await;
    let mut conn = store.acquire().await.unwrap();

    let stored = insert(conn.as_mut(), &new_user("before")).await;
    let replacement = new_user("after");
    conn.update_user(stored.id, &replacement).await.unwrap();

    let fetched = conn.get_user(stored.id).await.unwrap();
    assert_eq!(fetched.name, "after");
    assert_eq!(fetched.email, replacement.email);
}

#[tokio::test]
#[ignore = "Requires ROLODEX_TEST_DATABASE_URL"]
async fn test_missing_rows() {
    let store = postgres_store().await;
    let mut conn = store.acquire().await.unwrap();
    let missing = UserId::new(i32::MAX);

    assert!(matches!(
        conn.get_user(missing).await,
        Err(RepositoryError::NotFound)
    ));
    conn.update_user(missing, &new_user("ghost")).await.unwrap();
    conn.delete_user(missing).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires ROLODEX_TEST_DATABASE_URL"]
async fn test_delete_removes_row() {
    let store = postgres_store().await;
    let mut conn = store.acquire().await.unwrap();

    let stored = insert(conn.as_mut(), &new_user("gone")).await;
    conn.delete_user(stored.id).await.unwrap();

    assert!(matches!(
        conn.get_user(stored.id).await,
        Err(RepositoryError::NotFound)
    ));
}
