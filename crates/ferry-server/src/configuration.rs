use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment};
use ferry::agent::DEFAULT_MAX_ITERATIONS;
use ferry::providers::configs::{OpenAiProviderConfig, OPENAI_HOST, OPENAI_MODEL};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }
}

#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_openai_host")]
    pub host: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            host: default_openai_host(),
            api_key: None,
            model: default_model(),
            temperature: Some(0.0),
            max_tokens: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProviderSettings {
    /// Gateway settings without a credential, for the per-request factory
    pub fn template(&self) -> OpenAiProviderConfig {
        OpenAiProviderConfig {
            host: self.host.clone(),
            api_key: String::new(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// Gateway settings for the process-wide credential, if there is one
    pub fn ambient_config(&self) -> Option<OpenAiProviderConfig> {
        self.api_key
            .as_deref()
            .map(|key| self.template().with_api_key(key))
    }
}

#[derive(Debug, Deserialize)]
pub struct AgentSettings {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub agent: AgentSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut settings = Self::load()?;

        // The conventional variable is the fallback credential
        if settings.provider.api_key.is_none() {
            settings.provider.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        settings.provider.api_key = settings
            .provider
            .api_key
            .take()
            .filter(|key| !key.trim().is_empty());

        settings.validate()?;
        Ok(settings)
    }

    fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Provider defaults
            .set_default("provider.host", default_openai_host())?
            .set_default("provider.model", default_model())?
            .set_default("provider.temperature", 0.0)?
            .set_default("provider.timeout_secs", default_timeout_secs())?
            // Agent defaults
            .set_default("agent.max_iterations", default_max_iterations() as u64)?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("FERRY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize().map_err(|err| {
            tracing::debug!("Configuration error: {:?}", &err);
            ConfigError::Other(err)
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                env_var: to_env_var("agent.max_iterations"),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                env_var: to_env_var("provider.timeout_secs"),
                reason: "must be at least 1".to_string(),
            });
        }
        self.server.socket_addr()?;
        Ok(())
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_model() -> String {
    OPENAI_MODEL.to_string()
}

fn default_openai_host() -> String {
    OPENAI_HOST.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}
