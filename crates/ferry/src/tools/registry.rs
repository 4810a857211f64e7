//! Tool registry: name -> (spec, executor), resolved once at construction.
use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::builtin::{FunFact, RandomColor, Weather};
use super::schema::validate_arguments;
use super::wiki::WikiSearch;
use crate::errors::{AgentError, AgentResult};
use crate::models::tool::{Tool, ToolCall, ToolResult};

/// Executes one kind of tool. Implementations hold no state shared between calls,
/// so sibling calls from the same turn can run concurrently.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// The spec advertised to the model
    fn tool(&self) -> Tool;

    /// Run the tool with arguments that already passed schema validation
    async fn call(&self, arguments: Value) -> AgentResult<String>;
}

/// Deserialize validated arguments into the handler's typed parameters
pub fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> AgentResult<T> {
    serde_json::from_value(arguments).map_err(|e| AgentError::InvalidArguments(e.to_string()))
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
    handlers: HashMap<String, Box<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry the server runs with: weather, wiki, fun fact, color picker
    pub fn with_builtin_tools() -> AgentResult<Self> {
        let mut registry = Self::new();
        registry.register(Weather)?;
        registry.register(WikiSearch::new()?)?;
        registry.register(FunFact)?;
        registry.register(RandomColor)?;
        Ok(registry)
    }

    /// Add a tool. Names must be unique.
    pub fn register<H: ToolHandler + 'static>(&mut self, handler: H) -> AgentResult<()> {
        let tool = handler.tool();
        if self.handlers.contains_key(&tool.name) {
            return Err(AgentError::DuplicateTool(tool.name));
        }
        debug!(tool = %tool.name, "registered tool");
        self.handlers.insert(tool.name.clone(), Box::new(handler));
        self.tools.push(tool);
        Ok(())
    }

    /// Specs in registration order
    pub fn list_specs(&self) -> &[Tool] {
        &self.tools
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Look up, validate and run a tool
    pub async fn try_execute(&self, name: &str, arguments: Value) -> AgentResult<String> {
        let (tool, handler) = self
            .get(name)
            .zip(self.handlers.get(name))
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))?;
        validate_arguments(&tool.input_schema, &arguments)?;
        handler.call(arguments).await
    }

    /// Run a requested call. Failures are folded into an error-flagged result
    /// rather than returned, since the model may recover from them.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        match self.try_execute(&call.name, call.arguments.clone()).await {
            Ok(content) => ToolResult::success(&call.id, content),
            Err(err) => {
                warn!(tool = %call.name, id = %call.id, error = %err, "tool call failed");
                ToolResult::error(&call.id, err.to_string())
            }
        }
    }
}
