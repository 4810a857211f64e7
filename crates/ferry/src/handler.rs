use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::agent::{Agent, DEFAULT_MAX_ITERATIONS};
use crate::errors::RunError;
use crate::providers::base::Provider;
use crate::providers::factory::ProviderFactory;
use crate::tools::ToolRegistry;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatError {
    #[error("OpenAI API key is required. Either provide it in the request or set OPENAI_API_KEY environment variable.")]
    MissingCredential,

    #[error("Error processing request: OPENAI_API_KEY is set but the gateway could not be initialized")]
    GatewayUnavailable,

    #[error("Error processing request: {0}")]
    Failed(#[from] RunError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub tool_calls: Vec<String>,
}

/// Turns one user message into one reply, choosing which gateway to use
pub struct ChatHandler {
    registry: Arc<ToolRegistry>,
    factory: Arc<dyn ProviderFactory>,
    gateway: Option<Arc<dyn Provider>>,
    ambient_credential: bool,
    max_iterations: usize,
}

impl ChatHandler {
    pub fn new(registry: Arc<ToolRegistry>, factory: Arc<dyn ProviderFactory>) -> Self {
        Self {
            registry,
            factory,
            gateway: None,
            ambient_credential: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// The process-wide gateway used when a request brings no key
    pub fn with_gateway(mut self, gateway: Arc<dyn Provider>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Record whether a credential was found in the environment at startup
    pub fn with_ambient_credential(mut self, present: bool) -> Self {
        self.ambient_credential = present;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn gateway_initialized(&self) -> bool {
        self.gateway.is_some()
    }

    pub fn ambient_credential(&self) -> bool {
        self.ambient_credential
    }

    pub async fn handle(
        &self,
        message: &str,
        api_key: Option<&str>,
    ) -> Result<ChatReply, ChatError> {
        let provider = self.resolve_gateway(api_key)?;
        let agent = Agent::new(provider, self.registry.clone())
            .with_max_iterations(self.max_iterations);

        info!(chars = message.len(), "handling chat message");
        let run = agent.reply(message).await;

        Ok(ChatReply {
            response: run.final_text()?,
            tool_calls: run.invoked_tools(),
        })
    }

    fn resolve_gateway(&self, api_key: Option<&str>) -> Result<Arc<dyn Provider>, ChatError> {
        match api_key.map(str::trim).filter(|key| !key.is_empty()) {
            Some(key) => {
                debug!("using request credential");
                self.factory
                    .create(key)
                    .map_err(|err| ChatError::Failed(err.into()))
            }
            None => match &self.gateway {
                Some(gateway) => Ok(gateway.clone()),
                None if self.ambient_credential => Err(ChatError::GatewayUnavailable),
                None => Err(ChatError::MissingCredential),
            },
        }
    }
}
