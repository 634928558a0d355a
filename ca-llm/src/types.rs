use crate::error::{LlmError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    Required,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum ApprovalPolicy {
    Never,
}

/// A remote MCP server the completion endpoint may call on our behalf.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct McpTool {
    r#type: String,
    server_label: String,
    server_url: String,
    require_approval: ApprovalPolicy,
    headers: BTreeMap<String, String>,
}

impl McpTool {
    /// Build a descriptor authenticated with `bearer_token`.
    ///
    /// Fails on a blank token so a request can never carry an empty
    /// `Authorization: Bearer ` header.
    pub fn new(
        server_label: impl Into<String>,
        server_url: impl Into<String>,
        bearer_token: &str,
    ) -> Result<Self> {
        let server_label = server_label.into();
        let server_url = server_url.into();
        if server_label.trim().is_empty() {
            return Err(LlmError::InvalidInput(
                "mcp server_label must not be empty".to_string(),
            ));
        }
        if !(server_url.starts_with("https://") || server_url.starts_with("http://")) {
            return Err(LlmError::InvalidInput(format!(
                "mcp server_url must be an http(s) url, got {server_url:?}"
            )));
        }
        let token = bearer_token.trim();
        if token.is_empty() {
            return Err(LlmError::InvalidInput(format!(
                "mcp server {server_label} requires a bearer token"
            )));
        }

        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), format!("Bearer {token}"));
        Ok(Self {
            r#type: "mcp".to_string(),
            server_label,
            server_url,
            require_approval: ApprovalPolicy::Never,
            headers,
        })
    }

    pub fn server_label(&self) -> &str {
        &self.server_label
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn authorization(&self) -> Option<&str> {
        self.headers.get("Authorization").map(String::as_str)
    }
}

impl fmt::Debug for McpTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("McpTool")
            .field("server_label", &self.server_label)
            .field("server_url", &self.server_url)
            .field("require_approval", &self.require_approval)
            .field("headers", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub input: String,
    pub tools: Vec<McpTool>,
    pub tool_choice: ToolChoice,
}

impl CompletionRequest {
    /// One-shot request that forces the model to go through `tool`.
    pub fn tool_required(model: &str, input: &str, tool: &McpTool) -> Result<Self> {
        if model.trim().is_empty() {
            return Err(LlmError::InvalidInput("model must not be empty".to_string()));
        }
        if input.trim().is_empty() {
            return Err(LlmError::InvalidInput("input must not be empty".to_string()));
        }
        Ok(Self {
            model: model.to_string(),
            input: input.to_string(),
            tools: vec![tool.clone()],
            tool_choice: ToolChoice::Required,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    OutputText {
        #[serde(default)]
        text: String,
    },
    Refusal {
        #[serde(default)]
        refusal: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    OutputText {
        #[serde(default)]
        text: String,
    },
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    McpCall {
        #[serde(default)]
        name: String,
        #[serde(default)]
        server_label: String,
        #[serde(default)]
        output: Option<String>,
        #[serde(default)]
        error: Option<serde_json::Value>,
    },
    McpListTools {
        #[serde(default)]
        server_label: String,
        #[serde(default)]
        tools: Vec<McpToolInfo>,
    },
    #[serde(other)]
    Other,
}

/// Where the response keeps its text.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    /// The aggregate `output_text` convenience field.
    FlatText(String),
    /// Typed output items, in the order the API returned them.
    Items(Vec<OutputItem>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub id: Option<String>,
    pub status: Option<String>,
    pub usage: Option<Usage>,
    pub payload: ResponsePayload,
}

impl CompletionResponse {
    pub fn flat_text(text: impl Into<String>) -> Self {
        Self {
            id: None,
            status: None,
            usage: None,
            payload: ResponsePayload::FlatText(text.into()),
        }
    }

    pub fn items(items: Vec<OutputItem>) -> Self {
        Self {
            id: None,
            status: None,
            usage: None,
            payload: ResponsePayload::Items(items),
        }
    }
}
