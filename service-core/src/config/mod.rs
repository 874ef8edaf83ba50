use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Prefix for environment overrides, e.g. `APP__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "APP";

/// Server and logging settings shared by every binary.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// OTLP collector endpoint. Span export is disabled when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `<timestamp> [<LEVEL>] <file>:<line> - <message>`
    #[default]
    Text,
    Json,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            otlp_endpoint: None,
        }
    }
}

impl Config {
    /// `host:port` string suitable for binding a listener.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load a settings tree from `.env`, an optional `configuration` file and
/// `APP__`-prefixed environment variables, in increasing precedence.
///
/// Keys listed in `list_keys` are split on commas when they come from the
/// environment.
pub fn load_settings<T: DeserializeOwned>(list_keys: &[&str]) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let mut environment = Environment::with_prefix(ENV_PREFIX).separator("__");
    if !list_keys.is_empty() {
        environment = environment.list_separator(",");
        for key in list_keys {
            environment = environment.with_list_parse_key(key);
        }
    }

    let config = Cfg::builder()
        .add_source(File::with_name("configuration").required(false))
        .add_source(environment)
        .build()?;

    Ok(config.try_deserialize()?)
}
