//! Black-box tests for the user API over real HTTP.
//!
//! The default tests run against the in-memory store. The `postgres_*`
//! variants need `ROLODEX_TEST_DATABASE_URL` and are ignored by default.

use reqwest::{Client, StatusCode};
use rolodex_integration_tests::{TestServer, postgres_store, unique_email};
use rolodex_server::db::InMemoryUserStore;
use rolodex_server::state::AppState;
use serde_json::{Value, json};

async fn list_users(client: &Client, srv: &TestServer) -> Vec<Value> {
    let resp = client
        .get(srv.url("/users"))
        .send()
        .await
        .expect("Failed to list users");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("List body is not a JSON array")
}

/// Create, find, read, update, delete and confirm deletion of one user.
async fn lifecycle(srv: &TestServer) {
    let client = Client::new();
    let email = unique_email("ann");
    let before = list_users(&client, srv).await;

    let resp = client
        .post(srv.url("/user"))
        .json(&json!({"name": "Ann", "email": email}))
        .send()
        .await
        .expect("Failed to create user");
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(resp.text().await.unwrap(), "User created successfully");

    // The create response carries no id, so find it by email
    let after = list_users(&client, srv).await;
    assert_eq!(after.len(), before.len() + 1);
    let created: Vec<&Value> = after.iter().filter(|u| u["email"] == email).collect();
    assert_eq!(created.len(), 1);
    let id = created[0]["id"].as_i64().expect("id is an integer");
    assert!(before.iter().all(|u| u["id"].as_i64() != Some(id)));

    let resp = client
        .get(srv.url(&format!("/user/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let user: Value = resp.json().await.unwrap();
    assert_eq!(user, json!({"id": id, "name": "Ann", "email": email}));

    let new_email = unique_email("ann2");
    let resp = client
        .put(srv.url(&format!("/user/{id}")))
        .json(&json!({"name": "Ann2", "email": new_email}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "User updated successfully");

    let user: Value = client
        .get(srv.url(&format!("/user/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(user["name"], "Ann2");
    assert_eq!(user["email"], new_email);

    let resp = client
        .delete(srv.url(&format!("/user/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "User deleted successfully");

    let resp = client
        .get(srv.url(&format!("/user/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.text().await.unwrap(), "User not found");
}

// ============================================================================
// In-memory store
// ============================================================================

#[tokio::test]
async fn test_user_lifecycle() {
    let srv = TestServer::spawn(AppState::new(InMemoryUserStore::new())).await;
    lifecycle(&srv).await;
}

#[tokio::test]
async fn test_empty_list_is_json_array() {
    let srv = TestServer::spawn(AppState::new(InMemoryUserStore::new())).await;
    let resp = Client::new().get(srv.url("/users")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "application/json");
    assert_eq!(resp.text().await.unwrap(), "[]");
}

#[tokio::test]
async fn test_invalid_body_and_id() {
    let srv = TestServer::spawn(AppState::new(InMemoryUserStore::new())).await;
    let client = Client::new();

    let resp = client
        .post(srv.url("/user"))
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.text().await.unwrap(), "Invalid input");

    let resp = client
        .post(srv.url("/user"))
        .json(&json!({"name": "Ann", "email": "not-an-email"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.text().await.unwrap(), "invalid email format");

    let resp = client.get(srv.url("/user/abc")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.text().await.unwrap(), "Invalid user ID");
}

#[tokio::test]
async fn test_create_without_json_content_type() {
    let srv = TestServer::spawn(AppState::new(InMemoryUserStore::new())).await;
    let client = Client::new();
    let body = json!({"name": "Ann", "email": unique_email("ann")}).to_string();

    let resp = client
        .post(srv.url("/user"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(body.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client.post(srv.url("/user")).body(body).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    assert_eq!(list_users(&client, &srv).await.len(), 2);
}

#[tokio::test]
async fn test_store_unreachable() {
    let srv = TestServer::spawn(AppState::new(InMemoryUserStore::unavailable())).await;
    let client = Client::new();

    let resp = client.get(srv.url("/users")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        resp.text().await.unwrap(),
        "Failed to connect to the database"
    );

    let resp = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.get(srv.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_ids() {
    let srv = TestServer::spawn(AppState::new(InMemoryUserStore::new())).await;
    let client = Client::new();

    let requests = (0..16).map(|i| {
        client
            .post(srv.url("/user"))
            .json(&json!({"name": format!("User {i}"), "email": unique_email("bulk")}))
            .send()
    });
    for resp in spawn_all(requests).await {
        assert_eq!(resp.unwrap().status(), StatusCode::CREATED);
    }

    let users = list_users(&client, &srv).await;
    let mut ids: Vec<i64> = users.iter().filter_map(|u| u["id"].as_i64()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 16);
}

/// Drive a batch of request futures concurrently on the test runtime.
async fn spawn_all<F>(futures: impl Iterator<Item = F>) -> Vec<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    let handles: Vec<_> = futures.map(tokio::spawn).collect();
    let mut outputs = Vec::with_capacity(handles.len());
    for handle in handles {
        outputs.push(handle.await.expect("request task panicked"));
    }
    outputs
}

// ============================================================================
// PostgreSQL store
// ============================================================================

#[tokio::test]
#[ignore = "Requires ROLODEX_TEST_DATABASE_URL pointing at a disposable PostgreSQL database"]
async fn postgres_user_lifecycle() {
    let srv = TestServer::spawn(AppState::new(postgres_store().await)).await;
    lifecycle(&srv).await;
}

#[tokio::test]
#[ignore = "Requires ROLODEX_TEST_DATABASE_URL pointing at a disposable PostgreSQL database"]
async fn postgres_update_missing_id_reports_success() {
    let srv = TestServer::spawn(AppState::new(postgres_store().await)).await;
    let resp = Client::new()
        .put(srv.url(&format!("/user/{}", i32::MAX)))
        .json(&json!({"name": "Ghost", "email": unique_email("ghost")}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "User updated successfully");
}
