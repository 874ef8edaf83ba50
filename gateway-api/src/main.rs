use gateway_api::config::Settings;
use gateway_api::providers::EchoProvider;
use gateway_api::startup::Application;
use service_core::observability::init_tracing;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing("gateway-api", &settings.server);

    let provider = Arc::new(EchoProvider::new(&settings.models.available));
    let application = Application::build(settings, provider).await?;

    application.run_until_stopped().await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
