use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    agent_initialized: bool,
    environment_api_key: bool,
    tools_available: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let handler = &state.handler;
    Json(HealthResponse {
        status: "healthy",
        agent_initialized: handler.gateway_initialized(),
        environment_api_key: handler.ambient_credential(),
        tools_available: !handler.registry().is_empty(),
    })
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}
