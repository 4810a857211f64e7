use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::registry::{parse_arguments, ToolHandler};
use crate::errors::{AgentError, AgentResult};
use crate::models::tool::Tool;

pub const WIKIPEDIA_HOST: &str = "https://en.wikipedia.org";

/// Looks up the summary of a Wikipedia page
pub struct WikiSearch {
    client: Client,
    host: String,
}

#[derive(Deserialize)]
struct QueryArgs {
    query: String,
}

#[derive(Deserialize)]
struct PageSummary {
    extract: Option<String>,
}

impl WikiSearch {
    pub fn new() -> AgentResult<Self> {
        Self::with_host(WIKIPEDIA_HOST)
    }

    pub fn with_host<S: Into<String>>(host: S) -> AgentResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AgentError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            host: host.into(),
        })
    }

    async fn summary(&self, query: &str) -> Result<String, reqwest::Error> {
        let title = query.replace(' ', "_");
        let url = format!(
            "{}/api/rest_v1/page/summary/{}",
            self.host.trim_end_matches('/'),
            urlencoding::encode(&title)
        );
        debug!(%url, "fetching wiki summary");

        let summary: PageSummary = self.client.get(&url).send().await?.json().await?;
        Ok(summary
            .extract
            .unwrap_or_else(|| "No summary available.".to_string()))
    }
}

#[async_trait]
impl ToolHandler for WikiSearch {
    fn tool(&self) -> Tool {
        Tool::new(
            "wiki_search",
            "Searches Wikipedia for a summary of the given query",
            json!({
                "type": "object",
                "required": ["query"],
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The page title or topic to look up"
                    }
                }
            }),
        )
    }

    async fn call(&self, arguments: Value) -> AgentResult<String> {
        let args: QueryArgs = parse_arguments(arguments)?;
        // Lookup failures are reported as content so the model can explain them
        match self.summary(&args.query).await {
            Ok(summary) => Ok(summary),
            Err(e) => Ok(format!("Wiki search failed: {}", e)),
        }
    }
}
