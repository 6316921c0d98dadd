use crate::shared::config::model::EnvironmentConfig;

/// Protocol version pinned into the query string of every connection URL.
pub const API_VERSION: &str = "2016-12-12";

/// Fully rendered connection URL for a single query call.
///
/// Built once per call from the environment FQDN and the caller's resource
/// path; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
}

impl Endpoint {
    pub fn build(environment: &EnvironmentConfig, resource_path: &str, api_version: &str) -> Self {
        let scheme = if environment.use_tls { "wss" } else { "ws" };
        // Callers pass paths both with and without a leading slash.
        let path = resource_path.trim_start_matches('/');
        Self {
            url: format!(
                "{scheme}://{}/{path}?api-version={api_version}",
                environment.fqdn
            ),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}
