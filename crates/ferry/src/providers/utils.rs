use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value};

use super::base::{ModelTurn, Usage};
use crate::errors::ProviderError;
use crate::models::message::{Message, MessageContent};
use crate::models::role::Role;
use crate::models::tool::{Tool, ToolCall};

/// Convert internal Message format to OpenAI's API message specification
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut converted = json!({
            "role": message.role
        });
        let mut tool_calls = Vec::new();
        let mut output = Vec::new();

        for content in &message.content {
            match content {
                MessageContent::Text(text) => {
                    if !text.text.is_empty() {
                        converted["content"] = json!(text.text);
                    }
                }
                MessageContent::ToolRequest(call) => {
                    tool_calls.push(json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": sanitize_function_name(&call.name),
                            "arguments": call.arguments.to_string(),
                        }
                    }));
                }
                MessageContent::ToolResponse(response) => {
                    let result = &response.result;
                    // Error results are shown as output so the model can interpret the failure
                    let content = if result.is_error {
                        format!(
                            "The tool call returned the following error:\n{}",
                            result.content
                        )
                    } else {
                        result.content.clone()
                    };
                    output.push(json!({
                        "role": "tool",
                        "content": content,
                        "tool_call_id": result.id
                    }));
                }
            }
        }

        if !tool_calls.is_empty() {
            converted["tool_calls"] = json!(tool_calls);
        }

        if message.role == Role::User && converted.get("content").is_none() {
            converted["content"] = json!("");
        }

        if converted.get("content").is_some() || converted.get("tool_calls").is_some() {
            output.insert(0, converted);
        }
        messages_spec.extend(output);
    }

    messages_spec
}

/// Convert internal Tool format to OpenAI's API tool specification
pub fn tools_to_openai_spec(tools: &[Tool]) -> Result<Vec<Value>, ProviderError> {
    let mut tool_names = HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(ProviderError::InvalidRequest(format!(
                "Duplicate tool name: {}",
                tool.name
            )));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.input_schema,
            }
        }));
    }

    Ok(result)
}

/// Convert OpenAI's API response to the model's next turn
pub fn openai_response_to_turn(response: &Value) -> Result<ModelTurn, ProviderError> {
    let message = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .filter(|message| message.is_object())
        .ok_or_else(|| {
            ProviderError::MalformedResponse("response contained no choices".to_string())
        })?;

    let Some(tool_calls) = message.get("tool_calls").and_then(Value::as_array) else {
        let text = message
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Ok(ModelTurn::answer(text));
    };

    let calls = tool_calls
        .iter()
        .map(parse_tool_call)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ModelTurn::tool_request(calls))
}

fn parse_tool_call(tool_call: &Value) -> Result<ToolCall, ProviderError> {
    let id = tool_call["id"].as_str().unwrap_or_default();
    let function_name = tool_call["function"]["name"].as_str().unwrap_or_default();
    let arguments = tool_call["function"]["arguments"]
        .as_str()
        .unwrap_or_default();

    if !is_valid_function_name(function_name) {
        return Err(ProviderError::MalformedResponse(format!(
            "The provided function name '{}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+",
            function_name
        )));
    }

    let params = if arguments.trim().is_empty() {
        json!({})
    } else {
        serde_json::from_str::<Value>(arguments).map_err(|e| {
            ProviderError::MalformedResponse(format!(
                "Could not interpret tool use parameters for id {}: {}",
                id, e
            ))
        })?
    };

    Ok(ToolCall::new(id, function_name, params))
}

pub fn get_usage(response: &Value) -> Usage {
    let Some(usage) = response.get("usage") else {
        return Usage::default();
    };

    let count = |key: &str| {
        usage
            .get(key)
            .and_then(Value::as_i64)
            .and_then(|v| i32::try_from(v).ok())
    };
    let input_tokens = count("prompt_tokens");
    let output_tokens = count("completion_tokens");
    let total_tokens = count("total_tokens").or_else(|| match (input_tokens, output_tokens) {
        (Some(input), Some(output)) => Some(input + output),
        _ => None,
    });

    Usage::new(input_tokens, output_tokens, total_tokens)
}

fn invalid_name_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[^a-zA-Z0-9_-]").expect("function-name pattern compiles")
    })
}

fn sanitize_function_name(name: &str) -> String {
    invalid_name_chars().replace_all(name, "_").to_string()
}

fn is_valid_function_name(name: &str) -> bool {
    !name.is_empty() && !invalid_name_chars().is_match(name)
}

pub fn check_openai_context_length_error(error: &Value) -> Option<ProviderError> {
    let code = error.get("code")?.as_str()?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(ProviderError::ContextLengthExceeded(message))
    } else {
        None
    }
}
