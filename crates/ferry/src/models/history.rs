//! Append-only transcript of a single agent run.
//!
//! The history starts with one user message and only grows. Tool results can
//! only be appended as answers to the calls of the immediately preceding
//! assistant message, one per call and in call order.
use std::collections::VecDeque;

use thiserror::Error;

use super::message::Message;
use super::tool::{ToolCall, ToolResult};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    #[error("tool result '{0}' does not answer the next pending call")]
    UnmatchedResult(String),

    #[error("{0} tool calls are still waiting for results")]
    PendingResults(usize),

    #[error("an assistant tool request must carry at least one call")]
    EmptyToolRequest,

    #[error("the conversation already has a final answer")]
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct History {
    messages: Vec<Message>,
    pending: VecDeque<String>,
    finished: bool,
}

impl History {
    /// Start a history from the user's message
    pub fn new<S: Into<String>>(user_message: S) -> Self {
        Self {
            messages: vec![Message::user().with_text(user_message)],
            pending: VecDeque::new(),
            finished: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Identifiers of calls that have been issued but not yet answered
    pub fn pending_calls(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    fn ensure_open(&self) -> Result<(), HistoryError> {
        if self.finished {
            return Err(HistoryError::Finished);
        }
        if !self.pending.is_empty() {
            return Err(HistoryError::PendingResults(self.pending.len()));
        }
        Ok(())
    }

    /// Append the final assistant answer. Nothing can be appended afterwards.
    pub fn push_answer<S: Into<String>>(&mut self, text: S) -> Result<&Message, HistoryError> {
        self.ensure_open()?;
        self.finished = true;
        self.messages.push(Message::assistant().with_text(text));
        Ok(self.last_unchecked())
    }

    /// Append one assistant message carrying every requested call
    pub fn push_tool_requests(&mut self, calls: Vec<ToolCall>) -> Result<&Message, HistoryError> {
        self.ensure_open()?;
        if calls.is_empty() {
            return Err(HistoryError::EmptyToolRequest);
        }

        let mut message = Message::assistant();
        for call in calls {
            self.pending.push_back(call.id.clone());
            message = message.with_tool_request(call);
        }
        self.messages.push(message);
        Ok(self.last_unchecked())
    }

    /// Append the result for the next pending call
    pub fn push_tool_result<S: Into<String>>(
        &mut self,
        name: S,
        result: ToolResult,
    ) -> Result<&Message, HistoryError> {
        if self.pending.front() != Some(&result.id) {
            return Err(HistoryError::UnmatchedResult(result.id));
        }
        self.pending.pop_front();
        self.messages
            .push(Message::tool().with_tool_response(name, result));
        Ok(self.last_unchecked())
    }

    fn last_unchecked(&self) -> &Message {
        // Only called right after a push.
        &self.messages[self.messages.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::role::Role;
    use serde_json::json;

    fn call(id: &str) -> ToolCall {
        ToolCall::new(id, "get_weather", json!({"city": "Paris"}))
    }

    #[test]
    fn test_starts_with_single_user_message() {
        let history = History::new("Hi");
        assert_eq!(history.len(), 1);
        assert_eq!(history.messages()[0].role, Role::User);
        assert_eq!(history.messages()[0].text(), "Hi");
        assert!(!history.is_finished());
    }

    #[test]
    fn test_results_must_follow_call_order() {
        let mut history = History::new("Weather twice");
        history.push_tool_requests(vec![call("a"), call("b")]).unwrap();

        let err = history
            .push_tool_result("get_weather", ToolResult::success("b", "sunny"))
            .unwrap_err();
        assert_eq!(err, HistoryError::UnmatchedResult("b".into()));

        history
            .push_tool_result("get_weather", ToolResult::success("a", "sunny"))
            .unwrap();
        history
            .push_tool_result("get_weather", ToolResult::success("b", "sunny"))
            .unwrap();
        assert_eq!(history.pending_calls().count(), 0);
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn test_result_without_call_is_rejected() {
        let mut history = History::new("Hi");
        let err = history
            .push_tool_result("get_weather", ToolResult::success("x", "sunny"))
            .unwrap_err();
        assert_eq!(err, HistoryError::UnmatchedResult("x".into()));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_cannot_think_while_calls_pending() {
        let mut history = History::new("Hi");
        history.push_tool_requests(vec![call("a")]).unwrap();
        assert_eq!(
            history.push_answer("done").unwrap_err(),
            HistoryError::PendingResults(1)
        );
        assert_eq!(
            history.push_tool_requests(vec![call("b")]).unwrap_err(),
            HistoryError::PendingResults(1)
        );
    }

    #[test]
    fn test_answer_closes_history() {
        let mut history = History::new("Hi");
        history.push_answer("Hello!").unwrap();
        assert!(history.is_finished());
        assert_eq!(
            history.push_tool_requests(vec![call("a")]).unwrap_err(),
            HistoryError::Finished
        );
        assert_eq!(history.push_answer("again").unwrap_err(), HistoryError::Finished);
    }

    #[test]
    fn test_empty_tool_request_is_rejected() {
        let mut history = History::new("Hi");
        assert_eq!(
            history.push_tool_requests(Vec::new()).unwrap_err(),
            HistoryError::EmptyToolRequest
        );
    }
}
