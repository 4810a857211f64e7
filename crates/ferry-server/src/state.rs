use ferry::handler::ChatHandler;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<ChatHandler>,
}

impl AppState {
    pub fn new(handler: ChatHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}
