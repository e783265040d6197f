//! # athena-engine
//!
//! A crate for running SQL against Amazon Athena and collecting the results.
//!
//! ## Components
//!
//! - **Client:** Athena SDK client, using static keys or the default
//!   credential provider chain.
//! - **Poll:** Waits for a submitted query to reach a terminal state.
//! - **Executor:** Submit, wait and paginate, with a bounded number of
//!   concurrent engine calls.

pub mod client;
pub mod error;
pub mod executor;
pub mod mock_engine;
pub mod models;
pub mod poll;
pub mod results;

use crate::models::{QueryExecution, ResultPage, StartQueryExecutionInput};
use async_trait::async_trait;

pub use client::{AthenaClient, AthenaClientBuilder, StaticCredentials};
pub use error::EngineError;
pub use executor::{ExecutorConfig, QueryExecutor, QueryOutcome};
pub use mock_engine::MockEngine;
pub use models::QueryState;
pub use results::Row;

/// The query engine operations the executor relies on
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Submits a query and returns its execution id
    async fn start_query_execution(
        &self,
        input: StartQueryExecutionInput,
    ) -> Result<String, EngineError>;

    /// Returns the current state and statistics of an execution
    async fn get_query_execution(
        &self,
        query_execution_id: &str,
    ) -> Result<QueryExecution, EngineError>;

    /// Fetches one page of results; `next_token` is `None` for the first page
    async fn get_query_results(
        &self,
        query_execution_id: &str,
        next_token: Option<&str>,
    ) -> Result<ResultPage, EngineError>;
}
