//! Client for the OpenAI Responses API with a single remote MCP tool.
//!
//! Pure HTTP client, no terminal concerns.

mod client;
mod error;
mod extract;
mod responses;
mod types;

pub use client::CompletionApi;
pub use error::{LlmError, Result};
pub use extract::{NO_TEXT_PLACEHOLDER, ToolActivity, display_text, tool_activity};
pub use responses::{DEFAULT_OPENAI_BASE_URL, ResponsesClient};
pub use types::{
    CompletionRequest, CompletionResponse, ContentPart, McpTool, McpToolInfo, OutputItem,
    ResponsePayload, ToolChoice, Usage,
};
