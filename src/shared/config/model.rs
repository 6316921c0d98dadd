use serde::Deserialize;

use crate::client::endpoint::API_VERSION;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub client: ClientConfig,
    pub logging: LoggingConfig,
}

/// Host side of the query service.
///
/// Credential acquisition and refresh live with the caller; the client only
/// needs to know where to connect.
#[derive(Debug, Deserialize)]
pub struct EnvironmentConfig {
    pub fqdn: String,
    /// Production endpoints are TLS-only; plain `ws` exists for loopback
    /// test servers.
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
}

fn default_use_tls() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    /// Per-query deadline applied to every suspension point of a call.
    /// Absent means no deadline.
    pub query_timeout_secs: Option<u64>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            query_timeout_secs: None,
            api_version: default_api_version(),
        }
    }
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

use std::env;

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("STROOM_CONFIG").unwrap_or_else(|_| "config".to_string());
    load_settings_from(&config_path)
}

pub fn load_settings_from(config_path: &str) -> Result<Settings, config::ConfigError> {
    let settings: Settings = config::Config::builder()
        .add_source(config::File::with_name(config_path))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
