#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use gateway_api::config::Settings;
use gateway_api::providers::{
    ChatMessage, ChatOutput, EchoProvider, EmbeddingOutput, GenerationParams, ModelInfo,
    ModelProvider, ProviderError,
};
use gateway_api::{build_router, AppState};
use service_core::middleware::{AccessLogEntry, AccessLogSink};
use service_core::observability::SourceLocationFormat;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Keeps every access log entry for later inspection.
#[derive(Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<AccessLogEntry>>,
}

impl RecordingSink {
    pub fn entries(&self) -> Vec<AccessLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl AccessLogSink for RecordingSink {
    fn record(&self, entry: &AccessLogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Collects log lines emitted on the current thread until dropped.
///
/// `#[tokio::test]` runs on a current-thread runtime, so events from the
/// router land here too.
pub struct LogCapture {
    buffer: SharedBuffer,
    _guard: tracing::subscriber::DefaultGuard,
}

impl LogCapture {
    pub fn start() -> Self {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .event_format(SourceLocationFormat)
            .with_writer(move || writer.clone())
            .finish();

        Self {
            buffer,
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }

    pub fn output(&self) -> String {
        String::from_utf8(self.buffer.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.output()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

pub struct TestApp {
    pub router: Router,
    pub access_log: Arc<RecordingSink>,
}

impl TestApp {
    pub fn spawn() -> Self {
        let settings = Settings::default();
        let provider = Arc::new(EchoProvider::new(&settings.models.available));
        Self::with(settings, provider)
    }

    pub fn with(settings: Settings, provider: Arc<dyn ModelProvider>) -> Self {
        let settings = settings.validated().expect("invalid test settings");
        let access_log = Arc::new(RecordingSink::default());
        let router = build_router(AppState::new(settings, provider), access_log.clone());
        Self { router, access_log }
    }

    /// The router the Lambda entrypoint serves, with its response cap.
    pub fn for_lambda() -> Self {
        let settings = Settings::default();
        let provider = Arc::new(EchoProvider::new(&settings.models.available));
        let access_log = Arc::new(RecordingSink::default());
        let router =
            gateway_api::lambda::build_router(AppState::new(settings, provider), access_log.clone());
        Self { router, access_log }
    }

    pub fn with_provider(provider: Arc<dyn ModelProvider>) -> Self {
        Self::with(Settings::default(), provider)
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        use tower::ServiceExt;
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn get_req(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    raw_post(uri, &body.to_string())
}

pub fn raw_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_text(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(resp: Response) -> serde_json::Value {
    serde_json::from_str(&body_text(resp).await).unwrap()
}

pub fn content_type(resp: &Response) -> String {
    resp.headers()
        .get(header::CONTENT_TYPE)
        .expect("missing content-type")
        .to_str()
        .unwrap()
        .to_string()
}

/// Sleeps before answering so timings have a known lower bound.
pub struct SlowProvider {
    pub delay: Duration,
    inner: EchoProvider,
}

impl SlowProvider {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: EchoProvider::new(&Settings::default().models.available),
        }
    }
}

#[async_trait]
impl ModelProvider for SlowProvider {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        tokio::time::sleep(self.delay).await;
        self.inner.list_models().await
    }

    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<ChatOutput, ProviderError> {
        tokio::time::sleep(self.delay).await;
        self.inner.chat(model, messages, params).await
    }

    async fn embed(&self, model: &str, texts: &[String]) -> Result<EmbeddingOutput, ProviderError> {
        tokio::time::sleep(self.delay).await;
        self.inner.embed(model, texts).await
    }
}

/// Fails every call, either with a backend error or by panicking.
pub struct BrokenProvider {
    pub panic: bool,
}

impl BrokenProvider {
    fn fail<T>(&self) -> Result<T, ProviderError> {
        if self.panic {
            panic!("provider exploded");
        }
        Err(ProviderError::Backend("upstream timed out".to_string()))
    }
}

#[async_trait]
impl ModelProvider for BrokenProvider {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        self.fail()
    }

    async fn chat(
        &self,
        _model: &str,
        _messages: &[ChatMessage],
        _params: &GenerationParams,
    ) -> Result<ChatOutput, ProviderError> {
        self.fail()
    }

    async fn embed(&self, _model: &str, _texts: &[String]) -> Result<EmbeddingOutput, ProviderError> {
        self.fail()
    }
}
