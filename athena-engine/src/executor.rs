use crate::QueryEngine;
use crate::error::EngineError;
use crate::models::{QueryState, StartQueryExecutionInput};
use crate::poll::wait_for_completion;
use crate::results::{Row, RowAssembler};
use log::{debug, error, info};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

const DEFAULT_WORKGROUP: &str = "primary";

/// Settings shared by every query run through an executor
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub database: Option<String>,
    pub workgroup: Option<String>,
    pub output_location: Option<String>,
    pub poll_interval: Duration,
    pub max_wait: Duration,
    pub max_concurrency: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            database: None,
            workgroup: None,
            output_location: None,
            poll_interval: Duration::from_secs(1),
            max_wait: Duration::from_secs(300),
            max_concurrency: 5,
        }
    }
}

/// A completed query with its statistics and every result row
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub query_execution_id: String,
    pub status: QueryState,
    pub data_scanned_bytes: i64,
    pub execution_time_ms: i64,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Runs queries end to end: submit, wait for completion, collect all pages.
///
/// Engine calls are made on a pool of at most `max_concurrency` permits so a
/// burst of requests cannot open an unbounded number of upstream calls.
#[derive(Clone)]
pub struct QueryExecutor {
    engine: Arc<dyn QueryEngine>,
    config: ExecutorConfig,
    permits: Arc<Semaphore>,
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl QueryExecutor {
    pub fn new(engine: Arc<dyn QueryEngine>, config: ExecutorConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        Self {
            engine,
            config,
            permits,
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Executes `query` and returns every result row.
    ///
    /// `database` and `workgroup` fall back to the configured values; the
    /// workgroup finally falls back to `primary`. `max_wait` overrides the
    /// configured wait for this call only.
    pub async fn execute(
        &self,
        query: &str,
        database: Option<&str>,
        workgroup: Option<&str>,
        max_wait: Option<Duration>,
    ) -> Result<QueryOutcome, EngineError> {
        let database = database
            .filter(|d| !d.is_empty())
            .or(self.config.database.as_deref())
            .filter(|d| !d.is_empty())
            .ok_or(EngineError::MissingDatabase)?;
        let workgroup = workgroup
            .filter(|w| !w.is_empty())
            .or(self.config.workgroup.as_deref())
            .filter(|w| !w.is_empty())
            .unwrap_or(DEFAULT_WORKGROUP);

        let input = StartQueryExecutionInput {
            query_string: query.to_string(),
            database: database.to_string(),
            work_group: workgroup.to_string(),
            output_location: self.config.output_location.clone(),
        };

        let query_execution_id = {
            let _permit = self.acquire().await?;
            self.engine.start_query_execution(input).await?
        };
        info!("Started query execution {}", query_execution_id);

        let execution = wait_for_completion(
            self.engine.as_ref(),
            &self.permits,
            &query_execution_id,
            self.config.poll_interval,
            max_wait.unwrap_or(self.config.max_wait),
        )
        .await?;

        match execution.status.state {
            QueryState::Failed => {
                let reason = execution
                    .status
                    .state_change_reason
                    .unwrap_or_else(|| "Unknown error".to_string());
                error!("Query {} failed: {}", query_execution_id, reason);
                return Err(EngineError::QueryFailed(reason));
            }
            QueryState::Cancelled => return Err(EngineError::QueryCancelled),
            _ => {}
        }

        let (columns, rows) = self.fetch_all(&query_execution_id).await?;
        debug!(
            "Query {} returned {} rows",
            query_execution_id,
            rows.len()
        );

        Ok(QueryOutcome {
            query_execution_id,
            status: execution.status.state,
            data_scanned_bytes: execution.statistics.data_scanned_in_bytes,
            execution_time_ms: execution.statistics.engine_execution_time_in_millis,
            columns,
            rows,
        })
    }

    async fn fetch_all(
        &self,
        query_execution_id: &str,
    ) -> Result<(Vec<String>, Vec<Row>), EngineError> {
        let mut assembler = RowAssembler::default();
        let mut next_token: Option<String> = None;

        loop {
            let page = {
                let _permit = self.acquire().await?;
                self.engine
                    .get_query_results(query_execution_id, next_token.as_deref())
                    .await?
            };
            assembler.push_page(page.result_set);

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        Ok(assembler.finish())
    }

    async fn acquire(&self) -> Result<tokio::sync::SemaphorePermit<'_>, EngineError> {
        self.permits
            .acquire()
            .await
            .map_err(|_| EngineError::PoolClosed)
    }
}
