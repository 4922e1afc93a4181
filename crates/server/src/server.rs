use axum::{
    Router,
    routing::{get, put},
};

use std::sync::Arc;

use crate::{expenses, health, rates::RateSource};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub rates: Arc<dyn RateSource>,
}

/// Builds the HTTP routes.
///
/// Users are identified only by the `user_id` they send; there is no
/// authentication layer.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health::get))
        .route("/expenses/", get(expenses::list).post(expenses::create))
        .route("/expenses/report/", get(expenses::report))
        .route(
            "/expenses/{id}",
            put(expenses::update).delete(expenses::delete),
        )
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    rates: Arc<dyn RateSource>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        rates,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    rates: Arc<dyn RateSource>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, rates, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
