use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use service_core::error::{AppError, RequestValidationError};
use validator::Validate;

/// JSON body that must both deserialize and pass its `validator` rules.
///
/// Every failure (wrong content type, malformed JSON, missing or mistyped
/// field, failed rule) is rejected as [`AppError::Validation`].
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(RequestValidationError::from)?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

/// Path parameters whose rejection goes through the same validation
/// handler as request bodies.
pub struct ValidatedPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(RequestValidationError::from)?;

        Ok(ValidatedPath(value))
    }
}
