//! Event-driven entrypoint: one platform event drives one request/response
//! cycle through the same router the listener serves.

use crate::startup::{self, AppState};
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, Response};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::Router;
use lambda_http::{service_fn, Body as LambdaBody, Error};
use service_core::error::AppError;
use service_core::middleware::AccessLogSink;
use std::sync::Arc;
use tower::ServiceExt;

/// Synchronous invocation payload ceiling imposed by the platform.
pub const MAX_RESPONSE_BYTES: usize = 6 * 1024 * 1024;

/// The application router with response bodies capped at
/// [`MAX_RESPONSE_BYTES`].
pub fn build_router(state: AppState, access_log: Arc<dyn AccessLogSink>) -> Router {
    startup::assemble(state, access_log, Some(MAX_RESPONSE_BYTES))
}

/// Buffer the response body, replacing it with a 502 when it exceeds `limit`.
pub async fn limit_response_body(
    State(limit): State<usize>,
    req: Request<Body>,
    next: Next,
) -> axum::response::Response {
    let (parts, body) = next.run(req).await.into_parts();

    match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => Response::from_parts(parts, Body::from(bytes)),
        Err(e) => {
            tracing::error!(
                "Failed to buffer {} response within {} bytes: {}",
                parts.status,
                limit,
                e
            );
            AppError::BadGateway(format!("response body exceeds {} bytes", limit)).into_response()
        }
    }
}

/// Translate one platform request, run it through `app` and translate the
/// response back.
pub async fn handle_event(
    app: Router,
    event: lambda_http::Request,
) -> Result<Response<LambdaBody>, Error> {
    let (parts, body) = event.into_parts();
    let request = Request::from_parts(parts, Body::from(body.to_vec()));

    let response = app
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});

    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_RESPONSE_BYTES).await?;

    let body = if bytes.is_empty() {
        LambdaBody::Empty
    } else {
        match String::from_utf8(bytes.to_vec()) {
            Ok(text) => LambdaBody::Text(text),
            Err(e) => LambdaBody::Binary(e.into_bytes()),
        }
    };

    Ok(Response::from_parts(parts, body))
}

/// Serve invocations until the runtime shuts the process down.
pub async fn run(app: Router) -> Result<(), Error> {
    lambda_http::run(service_fn(move |event| handle_event(app.clone(), event))).await
}
