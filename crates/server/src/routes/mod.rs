//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health        - Liveness check
//! GET    /health/ready  - Readiness check (store reachable)
//!
//! GET    /users         - List all users (JSON array)
//! POST   /user          - Create a user (JSON body)
//! GET    /user/{id}     - Fetch one user (JSON object)
//! PUT    /user/{id}     - Replace a user's name and email (JSON body)
//! DELETE /user/{id}     - Delete a user
//! ```

pub mod health;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the user CRUD routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::index))
        .route("/user", post(users::create))
        .route(
            "/user/{id}",
            get(users::show).put(users::update).delete(users::destroy),
        )
}

/// Create the health check routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Create the main router with all routes.
pub fn routes() -> Router<AppState> {
    Router::new().merge(health_routes()).merge(user_routes())
}
