use gateway_api::config::Settings;
use gateway_api::providers::EchoProvider;
use gateway_api::{lambda, AppState};
use service_core::middleware::TracingAccessLog;
use service_core::observability::init_tracing;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    let settings = Settings::load()?;

    init_tracing("gateway-api", &settings.server);
    tracing::info!("Starting gateway-api Lambda function");

    let provider = Arc::new(EchoProvider::new(&settings.models.available));
    let app = lambda::build_router(AppState::new(settings, provider), Arc::new(TracingAccessLog));

    lambda::run(app).await
}
