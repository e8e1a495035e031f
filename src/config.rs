use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_WMS_ENV: &str = "PRD";
const DEFAULT_INTEGRATION_SOURCE: &str = "ot-console";
const CONFIG_DIR: &str = "config";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Backend REST root (historically `VITE_API_BASE_URL` in the web front-end)
    #[validate(url)]
    pub api_base_url: String,

    /// Optional override for the ERP integration endpoint; when unset the
    /// batch goes to `{api_base_url}/v1/work-orders/integration/send`
    pub integration_url: Option<String>,

    /// Environment tag passed to the WMS status poll (`?env=...`)
    #[serde(default = "default_wms_env")]
    pub wms_env: String,

    /// `source` field stamped on every integration batch
    #[serde(default = "default_integration_source")]
    pub integration_source: String,

    /// Serve canned in-memory data instead of calling the backend
    #[serde(default)]
    pub demo_mode: bool,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_wms_env() -> String {
    DEFAULT_WMS_ENV.to_string()
}

fn default_integration_source() -> String {
    DEFAULT_INTEGRATION_SOURCE.to_string()
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!("ot_console={level}");
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Default config (config/default.toml)
/// 2. Environment-specific config (config/{env}.toml)
/// 3. Environment variables (OT__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("OT_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("api_base_url", DEFAULT_API_BASE_URL)?
        .set_default("wms_env", DEFAULT_WMS_ENV)?
        .set_default("integration_source", DEFAULT_INTEGRATION_SOURCE)?
        .set_default("demo_mode", false)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
        .add_source(File::with_name(&format!("{CONFIG_DIR}/{run_env}")).required(false))
        .add_source(Environment::with_prefix("OT").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            api_base_url: "http://localhost:8080/api".into(),
            integration_url: None,
            wms_env: default_wms_env(),
            integration_source: default_integration_source(),
            demo_mode: false,
            environment: "development".into(),
            log_level: default_log_level(),
            log_json: false,
        }
    }

    #[test]
    fn valid_base_url_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn rejects_non_url_base() {
        let mut cfg = base_config();
        cfg.api_base_url = "not a url".into();
        assert!(cfg.validate().is_err());
    }
}
