use athena_engine::ExecutorConfig;
use confique::Config;
use std::time::Duration;

/// Configuration for the Athena query engine
#[derive(Debug, Config, Clone)]
pub struct AthenaConfig {
    /// AWS region of the Athena endpoint (default: us-east-1)
    #[config(env = "DASHBOARD_AWS_REGION", default = "us-east-1")]
    pub region: String,

    /// Static AWS access key id; the default provider chain is used when unset
    #[config(env = "DASHBOARD_AWS_ACCESS_KEY_ID")]
    pub access_key_id: Option<String>,

    /// Static AWS secret access key, paired with the access key id
    #[config(env = "DASHBOARD_AWS_SECRET_ACCESS_KEY")]
    pub secret_access_key: Option<String>,

    /// Session token for temporary credentials
    #[config(env = "DASHBOARD_AWS_SESSION_TOKEN")]
    pub session_token: Option<String>,

    /// Endpoint override; the regional endpoint is used when unset
    #[config(env = "DASHBOARD_ATHENA_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Workgroup queries run in (the engine falls back to `primary`)
    #[config(env = "DASHBOARD_ATHENA_WORKGROUP")]
    pub workgroup: Option<String>,

    /// Default database for queries that do not name one
    #[config(env = "DASHBOARD_ATHENA_DATABASE")]
    pub database: Option<String>,

    /// Table the report templates read from (default: audittt)
    #[config(env = "DASHBOARD_ATHENA_TABLE", default = "audittt")]
    pub table: String,

    /// S3 location for query results
    #[config(env = "DASHBOARD_ATHENA_OUTPUT_S3")]
    pub output_location: Option<String>,

    /// Interval between status polls in milliseconds (default: 1000)
    #[config(env = "DASHBOARD_ATHENA_POLL_INTERVAL_MS", default = 1000)]
    pub poll_interval_ms: u64,

    /// Maximum time to wait for a query in seconds (default: 300)
    #[config(env = "DASHBOARD_ATHENA_MAX_WAIT_SECS", default = 300)]
    pub max_wait_secs: u64,

    /// The timeout for a single Athena API call in seconds (default: 30)
    #[config(env = "DASHBOARD_ATHENA_CLIENT_TIMEOUT", default = 30)]
    pub client_timeout: u64,

    /// Maximum number of concurrent Athena API calls (default: 5)
    #[config(env = "DASHBOARD_ATHENA_MAX_CONCURRENCY", default = 5)]
    pub max_concurrency: usize,
}

impl AthenaConfig {
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            database: self.database.clone(),
            workgroup: self.workgroup.clone(),
            output_location: self.output_location.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_wait: Duration::from_secs(self.max_wait_secs),
            max_concurrency: self.max_concurrency,
        }
    }
}
