//! Engine-neutral views of query executions and result pages.
//!
//! The client converts SDK output into these types so the executor, the poll
//! loop and the in-memory engine share one vocabulary.

use serde::Serialize;
use std::fmt;

/// Everything needed to submit one query
#[derive(Debug, Clone, PartialEq)]
pub struct StartQueryExecutionInput {
    pub query_string: String,
    pub database: String,
    pub work_group: String,
    pub output_location: Option<String>,
}

/// Snapshot of a query execution as reported by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct QueryExecution {
    pub query_execution_id: String,
    pub status: QueryExecutionStatus,
    pub statistics: QueryExecutionStatistics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryExecutionStatus {
    pub state: QueryState,
    pub state_change_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryExecutionStatistics {
    pub data_scanned_in_bytes: i64,
    pub engine_execution_time_in_millis: i64,
}

/// Lifecycle state of a query execution
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl QueryState {
    /// Whether the engine will make no further transitions from this state
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            QueryState::Succeeded | QueryState::Failed | QueryState::Cancelled
        )
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QueryState::Queued => "QUEUED",
            QueryState::Running => "RUNNING",
            QueryState::Succeeded => "SUCCEEDED",
            QueryState::Failed => "FAILED",
            QueryState::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// One page of query results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPage {
    pub result_set: ResultSet,
    pub next_token: Option<String>,
}

/// Column names from the result metadata plus the raw text cells of each row.
///
/// The first row of the first page repeats the column names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}
