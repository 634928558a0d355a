use crate::client::CompletionApi;
use crate::error::{LlmError, Result};
use crate::types::{CompletionRequest, CompletionResponse, OutputItem, ResponsePayload, Usage};
use async_trait::async_trait;
use serde::Deserialize;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for the OpenAI Responses API (`POST /responses`).
#[derive(Clone)]
pub struct ResponsesClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ResponsesClient {
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cli-agent/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(%e, "reqwest client build failed; falling back to default client");
                reqwest::Client::new()
            });
        Self {
            http,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn responses_url(&self) -> String {
        format!("{}/responses", self.base_url)
    }
}

#[async_trait]
impl CompletionApi for ResponsesClient {
    #[tracing::instrument(level = "info", skip_all, fields(model = %request.model))]
    async fn create_completion(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let response = self
            .http
            .post(self.responses_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        decode_response(status.as_u16(), &body)
    }
}

#[derive(Debug, Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<ResponsesError>,
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Option<Vec<OutputItem>>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ResponsesError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ResponsesError {
    fn describe(&self) -> Option<String> {
        match (self.message.as_deref(), self.code.as_deref()) {
            (Some(m), _) if !m.trim().is_empty() => Some(m.to_string()),
            (_, Some(c)) if !c.trim().is_empty() => Some(c.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ResponsesError,
}

fn api_error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if let Some(msg) = envelope.error.describe() {
            return msg;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.to_string()
    }
}

fn decode_response(status: u16, body: &str) -> Result<CompletionResponse> {
    let parsed: ResponsesBody = serde_json::from_str(body)?;

    if let Some(err) = parsed.error.as_ref() {
        return Err(LlmError::Api {
            status,
            message: err
                .describe()
                .unwrap_or_else(|| "response reported an error".to_string()),
        });
    }
    if parsed.status.as_deref() == Some("failed") {
        return Err(LlmError::Api {
            status,
            message: "response failed without error details".to_string(),
        });
    }

    let payload = match parsed.output_text.filter(|t| !t.is_empty()) {
        Some(text) => ResponsePayload::FlatText(text),
        None => ResponsePayload::Items(parsed.output.unwrap_or_default()),
    };

    Ok(CompletionResponse {
        id: parsed.id,
        status: parsed.status,
        usage: parsed.usage,
        payload,
    })
}
