use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use ferry::handler::{ChatError, ChatReply};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    openai_api_key: Option<String>,
}

impl ChatRequest {
    /// `api_key` wins over the older field name
    fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .or(self.openai_api_key.as_deref())
    }
}

async fn handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, (StatusCode, Json<Value>)> {
    let preview: String = request.message.chars().take(100).collect();
    tracing::info!("Received message: {}", preview);

    match state
        .handler
        .handle(&request.message, request.credential())
        .await
    {
        Ok(reply) => {
            tracing::info!(tools = ?reply.tool_calls, "Chat completed");
            Ok(Json(reply))
        }
        Err(err) => {
            let status = match err {
                ChatError::MissingCredential => StatusCode::BAD_REQUEST,
                ChatError::GatewayUnavailable | ChatError::Failed(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            if status.is_server_error() {
                tracing::error!("Chat failed: {}", err);
            } else {
                tracing::warn!("Chat rejected: {}", err);
            }
            Err((status, Json(json!({ "detail": err.to_string() }))))
        }
    }
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(handler))
        .with_state(state)
}
