//! Session configuration, read once from the process environment.

use ca_llm::{DEFAULT_OPENAI_BASE_URL, LlmError, McpTool};
use std::fmt;
use thiserror::Error;

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const ZAPIER_MCP_API_KEY_VAR: &str = "ZAPIER_MCP_API_KEY";
pub const MODEL_VAR: &str = "CLI_AGENT_MODEL";
pub const OPENAI_BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const ZAPIER_MCP_SERVER_URL_VAR: &str = "ZAPIER_MCP_SERVER_URL";

pub const DEFAULT_MODEL: &str = "gpt-5-mini";
pub const ZAPIER_SERVER_LABEL: &str = "zapier";
pub const DEFAULT_ZAPIER_MCP_URL: &str = "https://mcp.zapier.com/api/mcp/mcp";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not set")]
    MissingCredential {
        var: &'static str,
        example: &'static str,
    },

    #[error("{var} must be an http(s) url, got {value:?}")]
    InvalidUrl { var: &'static str, value: String },

    #[error("invalid tool gateway: {0}")]
    InvalidGateway(#[from] LlmError),
}

impl ConfigError {
    /// Text shown to the user before exiting.
    pub fn remediation(&self) -> String {
        match self {
            Self::MissingCredential { var, example } => format!(
                "Error: {var} is not set. Export it before running.\nExample: export {var}={example}"
            ),
            other => format!("Error: {other}"),
        }
    }
}

/// Everything a chat session needs; immutable once built.
#[derive(Clone)]
pub struct SessionConfig {
    api_key: String,
    model: String,
    api_base_url: String,
    tool: McpTool,
}

impl SessionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get(OPENAI_API_KEY_VAR).ok_or(ConfigError::MissingCredential {
            var: OPENAI_API_KEY_VAR,
            example: "sk-...",
        })?;
        let gateway_key = get(ZAPIER_MCP_API_KEY_VAR).ok_or(ConfigError::MissingCredential {
            var: ZAPIER_MCP_API_KEY_VAR,
            example: "zap-...",
        })?;

        let model = get(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base_url =
            get(OPENAI_BASE_URL_VAR).unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
        let server_url =
            get(ZAPIER_MCP_SERVER_URL_VAR).unwrap_or_else(|| DEFAULT_ZAPIER_MCP_URL.to_string());

        validate_url(OPENAI_BASE_URL_VAR, &api_base_url)?;
        validate_url(ZAPIER_MCP_SERVER_URL_VAR, &server_url)?;

        let tool = McpTool::new(ZAPIER_SERVER_LABEL, server_url, &gateway_key)?;

        Ok(Self {
            api_key,
            model,
            api_base_url,
            tool,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn tool(&self) -> &McpTool {
        &self.tool
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("tool", &self.tool)
            .finish()
    }
}

fn validate_url(var: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("https://") || value.starts_with("http://") {
        return Ok(());
    }
    Err(ConfigError::InvalidUrl {
        var,
        value: value.to_string(),
    })
}
