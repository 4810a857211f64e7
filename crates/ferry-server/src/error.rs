use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),

    #[error("Invalid value for {env_var}: {reason}")]
    InvalidValue { env_var: String, reason: String },

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

/// The environment variable that sets a dotted settings key
pub fn to_env_var(field_path: &str) -> String {
    format!("FERRY_{}", field_path.to_uppercase().replace('.', "__"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_env_var() {
        assert_eq!(to_env_var("server.port"), "FERRY_SERVER__PORT");
        assert_eq!(to_env_var("agent.max_iterations"), "FERRY_AGENT__MAX_ITERATIONS");
    }
}
