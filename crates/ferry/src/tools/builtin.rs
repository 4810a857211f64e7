use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::registry::{parse_arguments, ToolHandler};
use crate::errors::AgentResult;
use crate::models::tool::Tool;

/// Canned weather report for a city
pub struct Weather;

#[derive(Deserialize)]
struct CityArgs {
    city: String,
}

#[async_trait]
impl ToolHandler for Weather {
    fn tool(&self) -> Tool {
        Tool::new(
            "get_weather",
            "Returns a dummy weather report for a given city",
            json!({
                "type": "object",
                "required": ["city"],
                "properties": {
                    "city": {
                        "type": "string",
                        "description": "The city to report the weather for"
                    }
                }
            }),
        )
    }

    async fn call(&self, arguments: Value) -> AgentResult<String> {
        let args: CityArgs = parse_arguments(arguments)?;
        Ok(format!("The weather in {} is sunny.", args.city))
    }
}

pub struct FunFact;

#[derive(Deserialize)]
struct TopicArgs {
    topic: String,
}

#[async_trait]
impl ToolHandler for FunFact {
    fn tool(&self) -> Tool {
        Tool::new(
            "fun_fact",
            "Returns a fun fact about the given topic",
            json!({
                "type": "object",
                "required": ["topic"],
                "properties": {
                    "topic": {
                        "type": "string",
                        "description": "The topic to share a fact about"
                    }
                }
            }),
        )
    }

    async fn call(&self, arguments: Value) -> AgentResult<String> {
        let args: TopicArgs = parse_arguments(arguments)?;
        Ok(format!(
            "Did you know that {} has a fascinating history?",
            args.topic
        ))
    }
}

/// Picks one entry from a caller supplied list of colors
pub struct RandomColor;

#[derive(Deserialize)]
struct ColorsArgs {
    colors: Vec<String>,
}

#[async_trait]
impl ToolHandler for RandomColor {
    fn tool(&self) -> Tool {
        Tool::new(
            "random_color",
            "Randomly selects a color from a given list of strings",
            json!({
                "type": "object",
                "required": ["colors"],
                "properties": {
                    "colors": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "The colors to choose from"
                    }
                }
            }),
        )
    }

    async fn call(&self, arguments: Value) -> AgentResult<String> {
        let args: ColorsArgs = parse_arguments(arguments)?;
        info!(colors = ?args.colors, "choosing a color");
        Ok(args
            .colors
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| "No colors provided.".to_string()))
    }
}
