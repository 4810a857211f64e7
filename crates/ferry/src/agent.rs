//! The orchestration loop.
//!
//! A run alternates between asking the model what to do (`Thinking`) and
//! executing the tools it asked for (`Acting`) until the model answers in
//! plain text (`Done`) or the run gives up (`Failed`).
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::errors::{ProviderError, RunError};
use crate::models::history::History;
use crate::models::message::Message;
use crate::models::tool::{Tool, ToolCall};
use crate::providers::base::{ModelTurn, Provider};
use crate::tools::ToolRegistry;

pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Returned to the user when a run ends without a usable answer
pub const FALLBACK_RESPONSE: &str = "I apologize, but I couldn't generate a response.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Thinking,
    Acting,
    Done,
    Failed,
}

/// How the loop classifies one model turn
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome {
    Final(String),
    Continue(Vec<ToolCall>),
}

impl From<ModelTurn> for AgentOutcome {
    fn from(turn: ModelTurn) -> Self {
        match turn {
            ModelTurn::Answer { text } => AgentOutcome::Final(text),
            ModelTurn::ToolRequest { calls } => AgentOutcome::Continue(calls),
        }
    }
}

/// The materialized outcome of one run
#[derive(Debug)]
pub struct AgentRun {
    pub history: History,
    pub result: Result<String, RunError>,
    /// Number of model turns taken, retries excluded
    pub iterations: usize,
}

impl AgentRun {
    pub fn state(&self) -> AgentState {
        match self.result {
            Ok(_) => AgentState::Done,
            Err(_) => AgentState::Failed,
        }
    }

    /// Names of tools the model asked for, first-seen order, no repeats
    pub fn invoked_tools(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for call in self
            .history
            .messages()
            .iter()
            .flat_map(|message| message.tool_requests())
        {
            if !names.contains(&call.name) {
                names.push(call.name.clone());
            }
        }
        names
    }

    /// The text to show the user. Liveness failures and empty answers become
    /// the fallback; gateway failures stay errors.
    pub fn final_text(&self) -> Result<String, RunError> {
        match &self.result {
            Ok(text) if !text.trim().is_empty() => Ok(text.clone()),
            Ok(_) => Ok(FALLBACK_RESPONSE.to_string()),
            Err(err) if err.is_liveness_failure() => Ok(FALLBACK_RESPONSE.to_string()),
            Err(err) => Err(err.clone()),
        }
    }
}

/// Agent pairs a model with the tools it may call
pub struct Agent {
    provider: Arc<dyn Provider>,
    registry: Arc<ToolRegistry>,
    max_iterations: usize,
}

impl Agent {
    pub fn new(provider: Arc<dyn Provider>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            registry,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub async fn reply(&self, user_message: &str) -> AgentRun {
        self.reply_with(user_message, |_| {}).await
    }

    /// Run to completion, handing every appended message to `observer`
    pub async fn reply_with<F>(&self, user_message: &str, mut observer: F) -> AgentRun
    where
        F: FnMut(&Message) + Send,
    {
        let mut history = History::new(user_message);
        let mut iterations = 0;
        let result = self
            .drive(&mut history, &mut iterations, &mut observer)
            .await;

        match &result {
            Ok(_) => info!(iterations, "agent finished"),
            Err(err) => error!(iterations, error = %err, "agent run failed"),
        }

        AgentRun {
            history,
            result,
            iterations,
        }
    }

    async fn drive<F>(
        &self,
        history: &mut History,
        iterations: &mut usize,
        observer: &mut F,
    ) -> Result<String, RunError>
    where
        F: FnMut(&Message) + Send,
    {
        let tools = self.registry.list_specs();
        let mut state = AgentState::Thinking;
        let mut empty_turns = 0;

        loop {
            debug!(?state, iteration = *iterations, "agent step");
            state = match state {
                AgentState::Thinking => {
                    if *iterations >= self.max_iterations {
                        return Err(RunError::IterationLimitExceeded(*iterations));
                    }
                    *iterations += 1;

                    let turn = self.think(history.messages(), tools).await?;
                    match AgentOutcome::from(turn) {
                        AgentOutcome::Final(text) => {
                            observer(history.push_answer(text)?);
                            AgentState::Done
                        }
                        AgentOutcome::Continue(calls) if calls.is_empty() => {
                            empty_turns += 1;
                            if empty_turns > 1 {
                                return Err(RunError::EmptyToolRequest(empty_turns));
                            }
                            warn!("model requested an empty set of tools, asking again");
                            AgentState::Thinking
                        }
                        AgentOutcome::Continue(calls) => {
                            empty_turns = 0;
                            observer(history.push_tool_requests(calls)?);
                            AgentState::Acting
                        }
                    }
                }
                AgentState::Acting => {
                    self.act(history, observer).await?;
                    AgentState::Thinking
                }
                AgentState::Done | AgentState::Failed => break,
            };
        }

        Ok(history.last().map(Message::text).unwrap_or_default())
    }

    /// One model turn. Rate limits and unparseable output get a single retry.
    async fn think(
        &self,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<ModelTurn, ProviderError> {
        match self.provider.complete(messages, tools).await {
            Err(err) if err.is_retryable() => {
                warn!(error = %err, "model call failed, retrying once");
                self.provider.complete(messages, tools).await
            }
            other => other,
        }
    }

    /// Execute the pending calls concurrently and record results in call order
    async fn act<F>(&self, history: &mut History, observer: &mut F) -> Result<(), RunError>
    where
        F: FnMut(&Message) + Send,
    {
        let calls: Vec<ToolCall> = history
            .last()
            .map(|message| message.tool_requests().into_iter().cloned().collect())
            .unwrap_or_default();

        let results = join_all(calls.iter().map(|call| self.registry.execute(call))).await;

        for (call, result) in calls.iter().zip(results) {
            observer(history.push_tool_result(&call.name, result)?);
        }
        Ok(())
    }
}
