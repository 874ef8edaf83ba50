//! OpenAI-compatible API routers, mounted together under the configured prefix.

pub mod chat;
pub mod embeddings;
pub mod models;

use crate::startup::AppState;
use axum::Router;
use serde::Serialize;

/// Token accounting returned by chat and embeddings responses.
#[derive(Debug, Serialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Model, chat and embeddings routes merged into one router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(models::router())
        .merge(chat::router())
        .merge(embeddings::router())
}

/// Paths served by [`api_router`], relative to the mount prefix.
pub const API_PATHS: &[&str] = &[
    models::MODELS_PATH,
    models::MODEL_PATH,
    chat::CHAT_COMPLETIONS_PATH,
    embeddings::EMBEDDINGS_PATH,
];
