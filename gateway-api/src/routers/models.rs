use crate::extract::ValidatedPath;
use crate::providers::ModelInfo;
use crate::startup::AppState;
use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use service_core::error::AppError;

pub const MODELS_PATH: &str = "/models";
pub const MODEL_PATH: &str = "/models/:model_id";

#[derive(Debug, Serialize)]
pub struct Model {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub owned_by: String,
}

impl From<ModelInfo> for Model {
    fn from(info: ModelInfo) -> Self {
        Self {
            id: info.id,
            object: "model",
            created: info.created,
            owned_by: info.owned_by,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModelList {
    pub object: &'static str,
    pub data: Vec<Model>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(MODELS_PATH, get(list_models))
        .route(MODEL_PATH, get(get_model))
}

#[tracing::instrument(skip(state))]
pub async fn list_models(State(state): State<AppState>) -> Result<Json<ModelList>, AppError> {
    let models = state.provider.list_models().await?;

    Ok(Json(ModelList {
        object: "list",
        data: models.into_iter().map(Model::from).collect(),
    }))
}

#[tracing::instrument(skip(state))]
pub async fn get_model(
    State(state): State<AppState>,
    ValidatedPath(model_id): ValidatedPath<String>,
) -> Result<Json<Model>, AppError> {
    let model = state.provider.get_model(&model_id).await?;
    Ok(Json(model.into()))
}
