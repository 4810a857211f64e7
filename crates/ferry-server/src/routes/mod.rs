// Export route modules
pub mod chat;
pub mod health;
pub mod index;
pub mod tools;

use crate::state::AppState;
use axum::Router;

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(index::routes())
        .merge(chat::routes(state.clone()))
        .merge(tools::routes(state.clone()))
        .merge(health::routes(state))
}
