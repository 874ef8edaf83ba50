use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Inbound data did not match the shape an endpoint expects.
///
/// The display form is the client-facing description and is returned
/// verbatim as the body of the 400 response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{description}")]
pub struct RequestValidationError {
    description: String,
}

impl RequestValidationError {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl From<JsonRejection> for RequestValidationError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.body_text())
    }
}

impl From<PathRejection> for RequestValidationError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for RequestValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::new(errors.to_string())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] RequestValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad Gateway: {0}")]
    BadGateway(String),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.into())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// Render a request-shape failure as `400 text/plain` with the error
/// description as the body.
pub fn validation_error_response(err: &RequestValidationError) -> Response {
    tracing::error!("Validation Error: app:{}", err);
    (StatusCode::BAD_REQUEST, err.to_string()).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        let (status, error_message) = match self {
            AppError::Validation(err) => return validation_error_response(&err),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, format!("Bad Gateway: {}", msg)),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            AppError::ConfigError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: error_message,
            }),
        )
            .into_response()
    }
}
