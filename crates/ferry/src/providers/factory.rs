use std::sync::Arc;

use super::{base::Provider, configs::OpenAiProviderConfig, openai::OpenAiProvider};
use crate::errors::ProviderError;

/// Builds a gateway for a given credential
pub trait ProviderFactory: Send + Sync {
    fn create(&self, api_key: &str) -> Result<Arc<dyn Provider>, ProviderError>;
}

/// Clones a template config and substitutes the key
pub struct OpenAiProviderFactory {
    template: OpenAiProviderConfig,
}

impl OpenAiProviderFactory {
    pub fn new(template: OpenAiProviderConfig) -> Self {
        Self { template }
    }
}

impl ProviderFactory for OpenAiProviderFactory {
    fn create(&self, api_key: &str) -> Result<Arc<dyn Provider>, ProviderError> {
        get_provider(self.template.with_api_key(api_key))
    }
}

pub fn get_provider(config: OpenAiProviderConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    if config.api_key.trim().is_empty() {
        return Err(ProviderError::UpstreamUnavailable(
            "missing OpenAI API key".to_string(),
        ));
    }
    Ok(Arc::new(OpenAiProvider::new(config)?))
}
