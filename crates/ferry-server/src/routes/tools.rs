use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ToolSummary {
    name: String,
    description: String,
}

#[derive(Debug, Serialize)]
struct ToolsResponse {
    tools: Vec<ToolSummary>,
}

async fn list_tools(State(state): State<AppState>) -> Json<ToolsResponse> {
    let tools = state
        .handler
        .registry()
        .list_specs()
        .iter()
        .map(|tool| ToolSummary {
            name: tool.name.clone(),
            description: tool.description.clone(),
        })
        .collect();

    Json(ToolsResponse { tools })
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/tools", get(list_tools))
        .with_state(state)
}
