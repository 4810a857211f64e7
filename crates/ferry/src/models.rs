//! These models represent the objects passed around by the agent
//!
//! There are a few different related formats we need to interact with:
//! - chat requests, sent from the HTTP client to the handler
//! - openai messages/tools, sent from the agent to the LLM
//! - tool calls, sent from the agent to the tool registry
//!
//! We always immediately convert those data models into the internal structs
//! using to/from helpers, so the loop only ever sees these types.
pub mod history;
pub mod message;
pub mod role;
pub mod tool;
