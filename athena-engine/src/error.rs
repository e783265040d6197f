use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database name is required")]
    MissingDatabase,

    #[error("AWS error: {code}: {message}")]
    Service { code: String, message: String },

    #[error("AWS SDK error: {0}")]
    Sdk(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Query was cancelled")]
    QueryCancelled,

    #[error("Worker pool closed")]
    PoolClosed,

    #[error("Query timeout after {} seconds", .0.as_secs())]
    Timeout(Duration),
}
