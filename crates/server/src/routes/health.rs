//! Health check endpoints.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies store connectivity before returning OK.
/// Returns 503 Service Unavailable if the store is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Ok(mut conn) = state.store().acquire().await else {
        return StatusCode::SERVICE_UNAVAILABLE;
    };

    match conn.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness ping failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryUserStore;

    #[tokio::test]
    async fn test_readiness_ok() {
        let state = AppState::new(InMemoryUserStore::new());
        assert_eq!(readiness(State(state)).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_ping_fails() {
        let state = AppState::new(InMemoryUserStore::failing());
        assert_eq!(
            readiness(State(state)).await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_readiness_store_down() {
        let state = AppState::new(InMemoryUserStore::unavailable());
        assert_eq!(
            readiness(State(state)).await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
