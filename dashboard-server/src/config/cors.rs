use confique::Config;

/// Cross-origin configuration
#[derive(Debug, Config, Clone)]
pub struct CorsConfig {
    /// Origins allowed to call the API with credentials
    /// Comma-separated list (default: "http://localhost:5173,http://localhost:3000")
    #[config(
        env = "DASHBOARD_CORS_ORIGINS",
        parse_env = confique::env::parse::list_by_comma,
        default = ["http://localhost:5173", "http://localhost:3000"]
    )]
    pub origins: Vec<String>,
}

impl CorsConfig {
    /// Get the configured origins, trimmed and without empty entries
    pub fn allowed_origins(&self) -> Vec<String> {
        self.origins
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
