//! Application assembly and the development listener.

use crate::config::Settings;
use crate::handlers;
use crate::lambda::limit_response_body;
use crate::providers::ModelProvider;
use crate::routers;
use axum::{middleware::from_fn_with_state, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::{permissive_cors, timing_middleware, AccessLogSink, TracingAccessLog};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;

pub const HEALTH_PATH: &str = "/health";
pub const OPENAPI_PATH: &str = "/openapi.json";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub provider: Arc<dyn ModelProvider>,
}

impl AppState {
    pub fn new(settings: Settings, provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            settings: Arc::new(settings),
            provider,
        }
    }
}

/// Compose the full application.
///
/// Layer order, outermost first: CORS, request timing, panic recovery,
/// routing. Preflight requests are answered by the CORS layer; everything
/// else is timed, including requests whose handler panics (they surface
/// as a plain 500).
pub fn build_router(state: AppState, access_log: Arc<dyn AccessLogSink>) -> Router {
    assemble(state, access_log, None)
}

/// [`build_router`] with an optional cap on buffered response bodies,
/// enforced inside the timing layer so the logged status is the one sent.
pub(crate) fn assemble(
    state: AppState,
    access_log: Arc<dyn AccessLogSink>,
    response_limit: Option<usize>,
) -> Router {
    let prefix = state.settings.api.route_prefix.clone();
    let cors = permissive_cors(state.settings.cors.allow_credentials);

    let router = Router::new()
        .route(HEALTH_PATH, get(handlers::health_check))
        .route(OPENAPI_PATH, get(handlers::openapi_document));

    let router = if prefix.is_empty() {
        router.merge(routers::api_router())
    } else {
        router.nest(&prefix, routers::api_router())
    };

    let router = router.layer(CatchPanicLayer::new());
    let router = match response_limit {
        Some(limit) => router.layer(from_fn_with_state(limit, limit_response_body)),
        None => router,
    };

    router
        .layer(from_fn_with_state(access_log, timing_middleware))
        .layer(cors)
        .with_state(state)
}

/// Network listener for local and container deployments.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(settings: Settings, provider: Arc<dyn ModelProvider>) -> Result<Self, AppError> {
        let address = settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            title = %settings.api.title,
            version = %settings.api.version,
            prefix = %settings.api.route_prefix,
            "Listening on {}:{}",
            settings.server.host,
            port
        );

        let router = build_router(AppState::new(settings, provider), Arc::new(TracingAccessLog));

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
