//! Readiness endpoint

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};

use crate::state::AppState;

/// Create the readiness router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .with_state(state)
}

/// Readiness check - pings the document store
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.clone();
    let checks: Vec<(&str, HealthCheckFuture)> = vec![(
        "document_store",
        Box::pin(async move { store.ping().await.map_err(|e| e.to_string()) }),
    )];

    match run_health_checks(checks).await {
        Ok(ready) => ready,
        Err(not_ready) => not_ready,
    }
}
