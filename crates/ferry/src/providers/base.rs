use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::models::message::Message;
use crate::models::tool::{Tool, ToolCall};

/// What the model decided to do with the conversation so far
#[derive(Debug, Clone, PartialEq)]
pub enum ModelTurn {
    /// Run these tools, then ask again. May be empty if the model misbehaves.
    ToolRequest { calls: Vec<ToolCall> },
    /// Final natural-language reply
    Answer { text: String },
}

impl ModelTurn {
    pub fn answer<S: Into<String>>(text: S) -> Self {
        ModelTurn::Answer { text: text.into() }
    }

    pub fn tool_request(calls: Vec<ToolCall>) -> Self {
        ModelTurn::ToolRequest { calls }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// Base trait for chat-completion backends
#[async_trait]
pub trait Provider: Send + Sync {
    /// Ask the model for its next turn. The history is only read.
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<ModelTurn, ProviderError>;
}
