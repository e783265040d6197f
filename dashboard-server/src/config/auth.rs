use confique::Config;

/// Token signing configuration
#[derive(Debug, Config, Clone)]
pub struct JwtConfig {
    /// HMAC secret used to sign and verify tokens
    #[config(
        env = "DASHBOARD_JWT_SECRET_KEY",
        default = "your-secret-key-change-in-production"
    )]
    pub secret_key: String,

    /// Token lifetime in minutes (default: 15)
    #[config(env = "DASHBOARD_JWT_EXPIRATION_MINUTES", default = 15)]
    pub expiration_minutes: u64,
}

/// The single administrator account served by the static user store
#[derive(Debug, Config, Clone)]
pub struct AdminConfig {
    #[config(env = "DASHBOARD_ADMIN_USERNAME", default = "admin")]
    pub username: String,

    #[config(env = "DASHBOARD_ADMIN_PASSWORD", default = "admin123")]
    pub password: String,

    #[config(env = "DASHBOARD_ADMIN_EMAIL", default = "admin@athena-dashboard.com")]
    pub email: String,
}
