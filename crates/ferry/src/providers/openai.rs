use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::debug;

use super::base::{ModelTurn, Provider};
use super::configs::OpenAiProviderConfig;
use super::utils::{
    check_openai_context_length_error, get_usage, messages_to_openai_spec,
    openai_response_to_turn, tools_to_openai_spec,
};
use crate::errors::ProviderError;
use crate::models::message::Message;
use crate::models::tool::Tool;

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn post(&self, payload: Value) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        if let Some(err) = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|value| value.get("error").and_then(check_openai_context_length_error))
        {
            return Err(err);
        }

        Err(match status {
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(body),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ProviderError::InvalidRequest(format!("{}: {}", status, body))
            }
            _ => ProviderError::UpstreamUnavailable(format!("{}: {}", status, body)),
        })
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<ModelTurn, ProviderError> {
        let messages_spec = messages_to_openai_spec(messages);
        let tools_spec = tools_to_openai_spec(tools)?;

        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_spec
        });

        if !tools_spec.is_empty() {
            payload["tools"] = json!(tools_spec);
        }
        if let Some(temp) = self.config.temperature {
            payload["temperature"] = json!(temp);
        }
        if let Some(tokens) = self.config.max_tokens {
            payload["max_tokens"] = json!(tokens);
        }

        let response = self.post(payload).await?;

        // Some compatible endpoints report errors with a 200
        if let Some(error) = response.get("error") {
            if let Some(err) = check_openai_context_length_error(error) {
                return Err(err);
            }
            return Err(ProviderError::UpstreamUnavailable(format!(
                "OpenAI API error: {}",
                error
            )));
        }

        let usage = get_usage(&response);
        debug!(
            model = %self.config.model,
            input_tokens = ?usage.input_tokens,
            output_tokens = ?usage.output_tokens,
            total_tokens = ?usage.total_tokens,
            "model usage"
        );

        openai_response_to_turn(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tool::ToolCall;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenAiProvider {
        let config = OpenAiProviderConfig {
            host: server.uri(),
            api_key: "test_api_key".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: Some(0.0),
            max_tokens: None,
            timeout: Duration::from_secs(5),
        };
        OpenAiProvider::new(config).unwrap()
    }

    async fn _setup_mock_server(template: ResponseTemplate) -> (MockServer, OpenAiProvider) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(template)
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        (mock_server, provider)
    }

    fn weather_tool() -> Tool {
        Tool::new(
            "get_weather",
            "Returns a dummy weather report for a given city",
            json!({
                "type": "object",
                "properties": {"city": {"type": "string"}},
                "required": ["city"]
            }),
        )
    }

    #[tokio::test]
    async fn test_complete_basic() {
        let response_body = json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Hello! How can I assist you today?",
                    "tool_calls": null
                },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 12,
                "completion_tokens": 15,
                "total_tokens": 27
            }
        });

        let (_server, provider) =
            _setup_mock_server(ResponseTemplate::new(200).set_body_json(response_body)).await;

        let messages = vec![Message::user().with_text("Hello?")];
        let turn = provider.complete(&messages, &[]).await.unwrap();

        assert_eq!(turn, ModelTurn::answer("Hello! How can I assist you today?"));
    }

    #[tokio::test]
    async fn test_complete_tool_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test_api_key"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "tools": [{"type": "function", "function": {"name": "get_weather"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-tool",
                "object": "chat.completion",
                "choices": [{
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_123",
                            "type": "function",
                            "function": {
                                "name": "get_weather",
                                "arguments": "{\"city\":\"Paris\"}"
                            }
                        }]
                    },
                    "finish_reason": "tool_calls"
                }],
                "usage": {
                    "prompt_tokens": 20,
                    "completion_tokens": 15,
                    "total_tokens": 35
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        let messages = vec![Message::user().with_text("What's the weather in Paris?")];
        let turn = provider.complete(&messages, &[weather_tool()]).await.unwrap();

        assert_eq!(
            turn,
            ModelTurn::tool_request(vec![ToolCall::new(
                "call_123",
                "get_weather",
                json!({"city": "Paris"})
            )])
        );
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let (_server, provider) = _setup_mock_server(
            ResponseTemplate::new(429).set_body_json(json!({"error": {"message": "slow down"}})),
        )
        .await;

        let err = provider
            .complete(&[Message::user().with_text("hi")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_rejected_credential_is_upstream_failure() {
        let (_server, provider) = _setup_mock_server(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": {"message": "Incorrect API key provided"}})),
        )
        .await;

        let err = provider
            .complete(&[Message::user().with_text("hi")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UpstreamUnavailable(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_server_error_is_upstream_failure() {
        let (_server, provider) = _setup_mock_server(ResponseTemplate::new(503)).await;

        let err = provider
            .complete(&[Message::user().with_text("hi")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_context_length_exceeded() {
        let (_server, provider) = _setup_mock_server(ResponseTemplate::new(400).set_body_json(
            json!({
                "error": {
                    "code": "context_length_exceeded",
                    "message": "This model's maximum context length is 128000 tokens."
                }
            }),
        ))
        .await;

        let err = provider
            .complete(&[Message::user().with_text("hi")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::ContextLengthExceeded(_)));
    }

    #[tokio::test]
    async fn test_unparseable_body_is_malformed() {
        let (_server, provider) =
            _setup_mock_server(ResponseTemplate::new(200).set_body_string("not json")).await;

        let err = provider
            .complete(&[Message::user().with_text("hi")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        let config = OpenAiProviderConfig {
            host: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_secs(2),
            ..OpenAiProviderConfig::new("test_api_key")
        };
        let provider = OpenAiProvider::new(config).unwrap();

        let err = provider
            .complete(&[Message::user().with_text("hi")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UpstreamUnavailable(_)));
    }
}
