use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{ModelTurn, Provider};

/// A mock provider that returns pre-configured turns for testing
pub struct MockProvider {
    script: Mutex<VecDeque<Result<ModelTurn, ProviderError>>>,
    repeat: Option<ModelTurn>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Result<ModelTurn, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            repeat: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Shorthand for a script of successful turns
    pub fn with_turns(turns: Vec<ModelTurn>) -> Self {
        Self::new(turns.into_iter().map(Ok).collect())
    }

    /// A provider that gives the same turn forever
    pub fn always(turn: ModelTurn) -> Self {
        Self {
            repeat: Some(turn),
            ..Self::new(Vec::new())
        }
    }

    /// Each history the provider was called with, oldest first
    pub fn calls(&self) -> Vec<Vec<Message>> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

// A panicking test thread must not hide the script from the others
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        messages: &[Message],
        _tools: &[Tool],
    ) -> Result<ModelTurn, ProviderError> {
        lock(&self.calls).push(messages.to_vec());

        if let Some(next) = lock(&self.script).pop_front() {
            return next;
        }
        match &self.repeat {
            Some(turn) => Ok(turn.clone()),
            None => Err(ProviderError::UpstreamUnavailable(
                "mock provider script exhausted".to_string(),
            )),
        }
    }
}
