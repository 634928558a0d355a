use crate::error::Result;
use crate::types::{CompletionRequest, CompletionResponse};
use async_trait::async_trait;

/// The single remote operation the chat loop depends on.
#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Create one completion. Called exactly once per forwarded line.
    async fn create_completion(&self, request: &CompletionRequest) -> Result<CompletionResponse>;
}
