mod configuration;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Result;
use ferry::handler::ChatHandler;
use ferry::providers::factory::{get_provider, OpenAiProviderFactory};
use ferry::tools::ToolRegistry;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = configuration::Settings::new()?;

    let registry = Arc::new(ToolRegistry::with_builtin_tools()?);
    let factory = Arc::new(OpenAiProviderFactory::new(settings.provider.template()));

    let ambient = settings.provider.ambient_config();
    let mut handler = ChatHandler::new(registry.clone(), factory)
        .with_ambient_credential(ambient.is_some())
        .with_max_iterations(settings.agent.max_iterations);

    match ambient.map(get_provider) {
        Some(Ok(gateway)) => {
            info!(model = %settings.provider.model, "gateway initialized from environment");
            handler = handler.with_gateway(gateway);
        }
        Some(Err(err)) => warn!("could not initialize gateway: {}", err),
        None => info!("no OPENAI_API_KEY set, requests must bring their own key"),
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state::AppState::new(handler)).layer(cors);

    let listener = tokio::net::TcpListener::bind(settings.server.socket_addr()?).await?;
    info!(
        tools = registry.len(),
        "listening on {}",
        listener.local_addr()?
    );
    axum::serve(listener, app).await?;
    Ok(())
}
