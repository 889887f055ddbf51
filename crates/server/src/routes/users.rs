//! User CRUD handlers.
//!
//! Each handler is single-shot: check the path id, decode and validate the
//! body, then take a connection from the store for the one statement it needs.
//! Bodies are decoded as JSON whatever their `Content-Type`.
//! The connection is dropped, and so released, when the handler returns.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};

use rolodex_core::{NewUser, User, UserId, UserInput};

use crate::db::UserConnection;
use crate::error::{AppError, Operation, Result};
use crate::state::AppState;

/// `GET /users`
///
/// # Errors
///
/// 500 if the store is unreachable, 404 if the query fails.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let mut conn = connect(&state).await?;
    let users = conn.list_users().await.map_err(AppError::NotFound)?;
    Ok(Json(users))
}

/// `POST /user`
///
/// The store-assigned id is not reported back.
///
/// # Errors
///
/// 400 for an undecodable or invalid body, 500 if the store is unreachable
/// or the insert fails.
pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, &'static str)> {
    let user = decode(&body)?;
    let mut conn = connect(&state).await?;
    conn.create_user(&user)
        .await
        .map_err(|e| AppError::operation(Operation::Create, e))?;
    Ok((StatusCode::CREATED, "User created successfully"))
}

/// `GET /user/{id}`
///
/// # Errors
///
/// 400 for a non-integer id, 500 if the store is unreachable, 404 if the user
/// does not exist or the query fails.
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<User>> {
    let id = parse_id(&id)?;
    let mut conn = connect(&state).await?;
    let user = conn.get_user(id).await.map_err(AppError::NotFound)?;
    Ok(Json(user))
}

/// `PUT /user/{id}`
///
/// Replacing a user that does not exist is reported as success.
///
/// # Errors
///
/// 400 for a non-integer id or an undecodable/invalid body, 500 if the store
/// is unreachable or the update fails.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<&'static str> {
    let id = parse_id(&id)?;
    let user = decode(&body)?;
    let mut conn = connect(&state).await?;
    conn.update_user(id, &user)
        .await
        .map_err(|e| AppError::operation(Operation::Update, e))?;
    Ok("User updated successfully")
}

/// `DELETE /user/{id}`
///
/// Deleting a user that does not exist is reported as success.
///
/// # Errors
///
/// 400 for a non-integer id, 500 if the store is unreachable or the delete fails.
pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>) -> Result<&'static str> {
    let id = parse_id(&id)?;
    let mut conn = connect(&state).await?;
    conn.delete_user(id)
        .await
        .map_err(|e| AppError::operation(Operation::Delete, e))?;
    Ok("User deleted successfully")
}

async fn connect(state: &AppState) -> Result<Box<dyn UserConnection>> {
    state
        .store()
        .acquire()
        .await
        .map_err(AppError::DatabaseUnavailable)
}

fn parse_id(raw: &str) -> Result<UserId> {
    raw.parse::<i32>()
        .map(UserId::new)
        .map_err(|_| AppError::InvalidUserId(raw.to_owned()))
}

fn decode(body: &Bytes) -> Result<NewUser> {
    let input: UserInput =
        serde_json::from_slice(body).map_err(|e| AppError::InvalidInput(e.to_string()))?;
    Ok(NewUser::try_from(input)?)
}
