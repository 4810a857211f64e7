use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::history::HistoryError;

/// Failures raised while resolving or running a tool.
///
/// These never abort a run: the agent turns them into error-flagged tool
/// results so the model can read them.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    #[error("Tool not found: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AgentResult<T> = Result<T, AgentError>;

/// Failures reported by a model gateway.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Context length exceeded: {0}")]
    ContextLengthExceeded(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Throttling and unparseable output get one more attempt before the run fails.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited(_) | ProviderError::MalformedResponse(_)
        )
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::MalformedResponse(err.to_string())
        } else {
            ProviderError::UpstreamUnavailable(err.to_string())
        }
    }
}

/// Reasons an agent run ends in the failed state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Iteration limit exceeded: no final answer after {0} model turns")]
    IterationLimitExceeded(usize),

    #[error("Model requested an empty set of tool calls {0} times in a row")]
    EmptyToolRequest(usize),

    #[error("Transcript invariant violated: {0}")]
    History(#[from] HistoryError),
}

impl RunError {
    /// True when the model kept talking without ever settling on an answer,
    /// as opposed to the gateway itself breaking.
    pub fn is_liveness_failure(&self) -> bool {
        matches!(
            self,
            RunError::IterationLimitExceeded(_) | RunError::EmptyToolRequest(_)
        )
    }
}
