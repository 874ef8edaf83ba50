use serde::Deserialize;
use service_core::config::{self as core_config, Config as ServerConfig};
use service_core::error::AppError;

pub const DEFAULT_ROUTE_PREFIX: &str = "/api/v1";
pub const DEFAULT_MODEL: &str = "echo-chat";
pub const DEFAULT_EMBEDDING_MODEL: &str = "echo-embed";

/// Environment keys whose values are comma-separated lists.
const LIST_KEYS: &[&str] = &["models.available"];

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub cors: CorsSettings,
    #[serde(default)]
    pub models: ModelSettings,
}

/// Application metadata and the mount point for the API routers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub route_prefix: String,
    pub title: String,
    pub description: String,
    pub summary: String,
    pub version: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
            title: "LLM Gateway APIs".to_string(),
            description: "OpenAI-compatible RESTful APIs for hosted language and embedding models."
                .to_string(),
            summary: "OpenAI-compatible RESTful APIs".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsSettings {
    pub allow_credentials: bool,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allow_credentials: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub default_model: String,
    pub default_embedding_model: String,
    /// Model ids served by the gateway.
    pub available: Vec<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_string(),
            default_embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            available: vec![DEFAULT_MODEL.to_string(), DEFAULT_EMBEDDING_MODEL.to_string()],
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, AppError> {
        let settings: Settings = core_config::load_settings(LIST_KEYS)?;
        settings.validated()
    }

    /// Normalise the route prefix and reject values that cannot be mounted.
    pub fn validated(mut self) -> Result<Self, AppError> {
        let prefix = self.api.route_prefix.trim().trim_end_matches('/');
        if !prefix.is_empty() && !prefix.starts_with('/') {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "api.route_prefix must start with '/', got '{}'",
                self.api.route_prefix
            )));
        }
        self.api.route_prefix = prefix.to_string();

        if self.models.available.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "models.available must list at least one model"
            )));
        }

        Ok(self)
    }
}
