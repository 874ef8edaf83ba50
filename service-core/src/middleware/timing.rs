//! Request timing and access logging.

use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One completed request/response pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLogEntry {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub elapsed: Duration,
}

impl fmt::Display for AccessLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} - Status: {} - Time: {:.4}s",
            self.method,
            self.url,
            self.status.as_u16(),
            self.elapsed.as_secs_f64()
        )
    }
}

/// Destination for access log entries.
///
/// Implementations must tolerate concurrent calls from in-flight requests.
pub trait AccessLogSink: Send + Sync {
    fn record(&self, entry: &AccessLogEntry);
}

/// Emits each entry as a debug-level `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAccessLog;

impl AccessLogSink for TracingAccessLog {
    fn record(&self, entry: &AccessLogEntry) {
        tracing::debug!("{}", entry);
    }
}

/// Absolute URL of the request as the client addressed it.
///
/// Origin-form URIs are completed from the `Host` header, using
/// `X-Forwarded-Proto` for the scheme when a proxy supplied one.
pub fn request_url(req: &Request) -> String {
    let uri = req.uri();
    if uri.scheme().is_some() {
        return uri.to_string();
    }

    let headers = req.headers();
    let Some(host) = headers.get(header::HOST).and_then(|h| h.to_str().ok()) else {
        return uri.to_string();
    };
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("http");

    format!("{}://{}{}", scheme, host, uri)
}

/// Time the rest of the pipeline and record one entry once it returns.
///
/// The response is passed through untouched. If the inner future is dropped
/// (client disconnect, host cancellation) nothing is recorded.
pub async fn timing_middleware(
    State(sink): State<Arc<dyn AccessLogSink>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let url = request_url(&req);
    let start = Instant::now();

    let response = next.run(req).await;

    sink.record(&AccessLogEntry {
        method,
        url,
        status: response.status(),
        elapsed: start.elapsed(),
    });

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http, middleware::from_fn_with_state, routing::get, Router};
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<AccessLogEntry>>);

    impl AccessLogSink for Recorder {
        fn record(&self, entry: &AccessLogEntry) {
            self.0.lock().unwrap().push(entry.clone());
        }
    }

    #[test]
    fn entry_renders_four_decimal_seconds() {
        let entry = AccessLogEntry {
            method: Method::POST,
            url: "http://localhost:8000/api/v1/chat/completions".to_string(),
            status: StatusCode::BAD_REQUEST,
            elapsed: Duration::from_micros(12_345),
        };

        assert_eq!(
            entry.to_string(),
            "POST http://localhost:8000/api/v1/chat/completions - Status: 400 - Time: 0.0123s"
        );
    }

    #[test]
    fn origin_form_uri_is_completed_from_host() {
        let req = http::Request::builder()
            .uri("/health?verbose=1")
            .header(header::HOST, "gateway.internal:8000")
            .header("x-forwarded-proto", "https")
            .body(Body::empty())
            .unwrap();

        assert_eq!(request_url(&req), "https://gateway.internal:8000/health?verbose=1");
    }

    #[test]
    fn uri_without_host_is_used_as_is() {
        let req = http::Request::builder().uri("/health").body(Body::empty()).unwrap();
        assert_eq!(request_url(&req), "/health");
    }

    #[tokio::test]
    async fn records_once_and_passes_response_through() {
        let recorder = Arc::new(Recorder::default());
        let sink: Arc<dyn AccessLogSink> = recorder.clone();
        let app = Router::new()
            .route("/teapot", get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }))
            .layer(from_fn_with_state(sink, timing_middleware));

        let response = app
            .oneshot(http::Request::builder().uri("/teapot").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        let entries = recorder.0.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].method, Method::GET);
        assert_eq!(entries[0].url, "/teapot");
        assert_eq!(entries[0].status, StatusCode::IM_A_TEAPOT);
    }
}
