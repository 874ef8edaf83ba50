//! Deterministic in-process provider for local development and tests.

use super::{
    ChatMessage, ChatOutput, EmbeddingOutput, FinishReason, GenerationParams, ModelInfo,
    ModelProvider, ProviderError, Role,
};
use async_trait::async_trait;

/// Length of every vector returned by [`EchoProvider::embed`].
pub const EMBEDDING_DIMENSIONS: usize = 16;

const OWNER: &str = "gateway";

/// Replies with the last user message and embeds text by folding its bytes.
pub struct EchoProvider {
    models: Vec<ModelInfo>,
}

impl EchoProvider {
    pub fn new(model_ids: &[String]) -> Self {
        let created = chrono::Utc::now().timestamp();
        let models = model_ids
            .iter()
            .map(|id| ModelInfo {
                id: id.clone(),
                created,
                owned_by: OWNER.to_string(),
            })
            .collect();
        Self { models }
    }

    fn ensure_known(&self, model: &str) -> Result<(), ProviderError> {
        if self.models.iter().any(|m| m.id == model) {
            Ok(())
        } else {
            Err(ProviderError::ModelNotFound(model.to_string()))
        }
    }
}

fn count_tokens(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

fn fold_embedding(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0_f32; EMBEDDING_DIMENSIONS];
    for (i, byte) in text.bytes().enumerate() {
        vector[i % EMBEDDING_DIMENSIONS] += f32::from(byte);
    }

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
    vector
}

#[async_trait]
impl ModelProvider for EchoProvider {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        Ok(self.models.clone())
    }

    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<ChatOutput, ProviderError> {
        self.ensure_known(model)?;

        let prompt_tokens = messages.iter().map(|m| count_tokens(&m.content)).sum();
        let reply = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let words: Vec<&str> = reply.split_whitespace().collect();
        let limit = params.max_tokens.map_or(words.len(), |max| max as usize);
        let (content, finish_reason) = if words.len() > limit {
            (words[..limit].join(" "), FinishReason::Length)
        } else {
            (reply.to_string(), FinishReason::Stop)
        };

        Ok(ChatOutput {
            completion_tokens: count_tokens(&content),
            content,
            prompt_tokens,
            finish_reason,
        })
    }

    async fn embed(&self, model: &str, texts: &[String]) -> Result<EmbeddingOutput, ProviderError> {
        self.ensure_known(model)?;

        Ok(EmbeddingOutput {
            vectors: texts.iter().map(|t| fold_embedding(t)).collect(),
            prompt_tokens: texts.iter().map(|t| count_tokens(t)).sum(),
        })
    }
}
