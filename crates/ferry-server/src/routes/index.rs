use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

async fn index() -> Json<Value> {
    Json(json!({
        "message": "Ferry agent API is running!",
        "status": "healthy",
        "endpoints": {
            "chat": "/chat",
            "tools": "/tools",
            "health": "/health"
        }
    }))
}

pub fn routes() -> Router {
    Router::new().route("/", get(index))
}
