use super::Usage;
use crate::extract::ValidatedJson;
use crate::startup::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::{Validate, ValidationError};

pub const EMBEDDINGS_PATH: &str = "/embeddings";

/// A single text or a batch of texts.
#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    Single(String),
    Batch(Vec<String>),
}

impl EmbeddingInput {
    pub fn into_texts(self) -> Vec<String> {
        match self {
            EmbeddingInput::Single(text) => vec![text],
            EmbeddingInput::Batch(texts) => texts,
        }
    }
}

fn validate_input(input: &EmbeddingInput) -> Result<(), ValidationError> {
    match input {
        EmbeddingInput::Batch(texts) if texts.is_empty() => {
            let mut err = ValidationError::new("length");
            err.message = Some("input must contain at least one text".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingFormat {
    #[default]
    Float,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EmbeddingsRequest {
    /// Falls back to the configured default embedding model.
    pub model: Option<String>,
    #[validate(custom(function = "validate_input"))]
    pub input: EmbeddingInput,
    #[serde(default)]
    pub encoding_format: EncodingFormat,
}

#[derive(Debug, Serialize)]
pub struct Embedding {
    pub object: &'static str,
    pub embedding: Vec<f32>,
    pub index: usize,
}

#[derive(Debug, Serialize)]
pub struct EmbeddingsResponse {
    pub object: &'static str,
    pub data: Vec<Embedding>,
    pub model: String,
    pub usage: Usage,
}

pub fn router() -> Router<AppState> {
    Router::new().route(EMBEDDINGS_PATH, post(embeddings))
}

#[tracing::instrument(skip(state, request))]
pub async fn embeddings(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<EmbeddingsRequest>,
) -> Result<Json<EmbeddingsResponse>, AppError> {
    let model = request
        .model
        .unwrap_or_else(|| state.settings.models.default_embedding_model.clone());
    let texts = request.input.into_texts();

    let output = state.provider.embed(&model, &texts).await?;

    let data = output
        .vectors
        .into_iter()
        .enumerate()
        .map(|(index, embedding)| Embedding {
            object: "embedding",
            embedding,
            index,
        })
        .collect();

    Ok(Json(EmbeddingsResponse {
        object: "list",
        data,
        model,
        usage: Usage {
            prompt_tokens: output.prompt_tokens,
            completion_tokens: 0,
            total_tokens: output.prompt_tokens,
        },
    }))
}
