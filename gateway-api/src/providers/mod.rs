//! Model backend abstraction.
//!
//! Routers only validate request shape and translate between wire formats;
//! generation itself happens behind [`ModelProvider`].

pub mod echo;

pub use echo::EchoProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider error: {0}")]
    Backend(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::ModelNotFound(_) => AppError::NotFound(err.to_string()),
            ProviderError::Backend(msg) => AppError::BadGateway(msg),
        }
    }
}

/// A model the gateway can route requests to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: String,
    /// Unix timestamp (seconds).
    pub created: i64,
    pub owned_by: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Sampling parameters forwarded to the backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationParams {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
}

#[derive(Debug, Clone)]
pub struct ChatOutput {
    pub content: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub finish_reason: FinishReason,
}

#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    /// One vector per input text, in input order.
    pub vectors: Vec<Vec<f32>>,
    pub prompt_tokens: u32,
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError>;

    async fn get_model(&self, model_id: &str) -> Result<ModelInfo, ProviderError> {
        self.list_models()
            .await?
            .into_iter()
            .find(|model| model.id == model_id)
            .ok_or_else(|| ProviderError::ModelNotFound(model_id.to_string()))
    }

    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<ChatOutput, ProviderError>;

    async fn embed(&self, model: &str, texts: &[String]) -> Result<EmbeddingOutput, ProviderError>;
}
