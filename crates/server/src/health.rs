//! Liveness endpoint.

use api_types::health::Health;
use axum::{Json, extract::State, http::StatusCode};

use crate::server::ServerState;

/// Answers `ok` when the database responds to a ping.
pub async fn get(State(state): State<ServerState>) -> (StatusCode, Json<Health>) {
    match state.engine.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(Health {
                status: "ok".to_string(),
            }),
        ),
        Err(err) => {
            tracing::error!("health check failed: {err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Health {
                    status: "unavailable".to_string(),
                }),
            )
        }
    }
}
