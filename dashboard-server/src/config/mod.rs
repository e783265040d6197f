use crate::config::athena::AthenaConfig;
use crate::config::auth::{AdminConfig, JwtConfig};
use crate::config::cors::CorsConfig;
use confique::Config;

pub mod athena;
pub mod auth;
pub mod cors;

/// Optional configuration file, read after the environment
const CONFIG_FILE: &str = "dashboard.toml";

/// Main configuration structure for the dashboard server
#[derive(Debug, Config, Clone)]
pub struct Settings {
    /// Application name reported by the health endpoint
    #[config(env = "DASHBOARD_APP_NAME", default = "Athena Dashboard API")]
    pub app_name: String,

    /// Application version reported by the health endpoint
    #[config(env = "DASHBOARD_APP_VERSION", default = "0.1.0")]
    pub app_version: String,

    /// Debug mode (logs built report queries)
    #[config(env = "DASHBOARD_DEBUG", default = false)]
    pub debug: bool,

    /// The port the server will listen to (default: 8000)
    #[config(env = "DASHBOARD_PORT", default = 8000)]
    pub port: u16,

    /// Athena connection and execution settings
    #[config(nested)]
    pub athena: AthenaConfig,

    /// Token signing settings
    #[config(nested)]
    pub jwt: JwtConfig,

    /// The built-in administrator account
    #[config(nested)]
    pub admin: AdminConfig,

    /// Cross-origin settings for the dashboard frontend
    #[config(nested)]
    pub cors: CorsConfig,
}

impl Settings {
    /// Loads settings from `.env`, the environment, then `dashboard.toml`.
    /// Environment variables take precedence over the file.
    pub fn new() -> Result<Self, confique::Error> {
        dotenv::dotenv().ok();
        Self::builder().env().file(CONFIG_FILE).load()
    }

    /// Settings with every default and no external sources
    #[cfg(test)]
    pub fn defaults() -> Self {
        Self::builder()
            .load()
            .expect("Default settings should load")
    }

    #[cfg(test)]
    pub fn for_test_with_mocks(athena_mock: &wiremock::MockServer) -> Self {
        let mut settings = Self::defaults();
        settings.athena = AthenaConfig {
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            secret_access_key: Some("test-secret".to_string()),
            endpoint: Some(athena_mock.uri()),
            database: Some("clinical_audit".to_string()),
            poll_interval_ms: 10,
            max_wait_secs: 2,
            ..settings.athena
        };
        settings.jwt.secret_key = "test-jwt-secret".to_string();
        settings.port = 0; // Let the OS choose a port
        settings
    }
}
