use super::Usage;
use crate::extract::ValidatedJson;
use crate::providers::{ChatMessage, FinishReason, GenerationParams, Role};
use crate::startup::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use service_core::error::{AppError, RequestValidationError};
use validator::Validate;

pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

#[derive(Debug, Deserialize, Validate)]
pub struct ChatCompletionRequest {
    /// Falls back to the configured default model.
    pub model: Option<String>,
    #[validate(length(min = 1, message = "messages must contain at least one message"))]
    pub messages: Vec<ChatMessage>,
    #[validate(range(min = 0.0, max = 2.0, message = "temperature must be between 0 and 2"))]
    pub temperature: Option<f32>,
    #[validate(range(min = 1, message = "max_tokens must be at least 1"))]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

#[derive(Debug, Serialize)]
pub struct Choice {
    pub index: u32,
    pub message: ChatMessage,
    pub finish_reason: FinishReason,
}

pub fn router() -> Router<AppState> {
    Router::new().route(CHAT_COMPLETIONS_PATH, post(chat_completions))
}

#[tracing::instrument(skip(state, request))]
pub async fn chat_completions(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ChatCompletionRequest>,
) -> Result<Json<ChatCompletionResponse>, AppError> {
    if request.stream {
        return Err(RequestValidationError::new(
            "stream: streaming responses are not supported by this endpoint",
        )
        .into());
    }

    let model = request
        .model
        .unwrap_or_else(|| state.settings.models.default_model.clone());
    let params = GenerationParams {
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    };

    let output = state
        .provider
        .chat(&model, &request.messages, &params)
        .await?;

    Ok(Json(ChatCompletionResponse {
        id: format!("chatcmpl-{}", uuid::Uuid::new_v4().simple()),
        object: "chat.completion",
        created: chrono::Utc::now().timestamp(),
        model,
        choices: vec![Choice {
            index: 0,
            message: ChatMessage {
                role: Role::Assistant,
                content: output.content,
            },
            finish_reason: output.finish_reason,
        }],
        usage: Usage {
            prompt_tokens: output.prompt_tokens,
            completion_tokens: output.completion_tokens,
            total_tokens: output.prompt_tokens + output.completion_tokens,
        },
    }))
}
