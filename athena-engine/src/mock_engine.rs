use crate::QueryEngine;
use crate::error::EngineError;
use crate::models::{
    QueryExecution, QueryExecutionStatistics, QueryExecutionStatus, QueryState, ResultPage,
    StartQueryExecutionInput,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// An in-memory engine that replays a fixed script of states and result pages.
///
/// Each status poll pops the next scripted state; the last state repeats once
/// the script is exhausted. Result pages are served in order and linked with
/// synthetic continuation tokens.
#[derive(Debug)]
pub struct MockEngine {
    execution_id: String,
    states: Mutex<VecDeque<(QueryState, Option<String>)>>,
    statistics: QueryExecutionStatistics,
    pages: Vec<ResultPage>,
    submitted: Mutex<Vec<StartQueryExecutionInput>>,
    polls: Mutex<usize>,
}

impl MockEngine {
    pub fn new(execution_id: impl Into<String>) -> Self {
        Self {
            execution_id: execution_id.into(),
            states: Mutex::new(VecDeque::from([(QueryState::Succeeded, None)])),
            statistics: QueryExecutionStatistics::default(),
            pages: Vec::new(),
            submitted: Mutex::new(Vec::new()),
            polls: Mutex::new(0),
        }
    }

    /// Replaces the scripted sequence of states returned by status polls
    pub fn with_states(self, states: impl IntoIterator<Item = QueryState>) -> Self {
        let states = states.into_iter().map(|s| (s, None)).collect();
        Self {
            states: Mutex::new(states),
            ..self
        }
    }

    /// Ends the script with a failed state carrying the given reason
    pub fn failing_with(self, reason: impl Into<String>) -> Self {
        Self {
            states: Mutex::new(VecDeque::from([(QueryState::Failed, Some(reason.into()))])),
            ..self
        }
    }

    pub fn with_statistics(self, data_scanned_in_bytes: i64, execution_time_ms: i64) -> Self {
        Self {
            statistics: QueryExecutionStatistics {
                data_scanned_in_bytes,
                engine_execution_time_in_millis: execution_time_ms,
            },
            ..self
        }
    }

    pub fn with_pages(self, pages: Vec<ResultPage>) -> Self {
        Self { pages, ..self }
    }

    /// Inputs received by `start_query_execution`, in call order
    pub fn submitted(&self) -> Vec<StartQueryExecutionInput> {
        self.submitted.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn poll_count(&self) -> usize {
        self.polls.lock().map(|p| *p).unwrap_or_default()
    }
}

#[async_trait]
impl QueryEngine for MockEngine {
    async fn start_query_execution(
        &self,
        input: StartQueryExecutionInput,
    ) -> Result<String, EngineError> {
        if let Ok(mut submitted) = self.submitted.lock() {
            submitted.push(input);
        }
        Ok(self.execution_id.clone())
    }

    async fn get_query_execution(
        &self,
        query_execution_id: &str,
    ) -> Result<QueryExecution, EngineError> {
        if let Ok(mut polls) = self.polls.lock() {
            *polls += 1;
        }
        let (state, reason) = match self.states.lock() {
            Ok(mut states) if states.len() > 1 => states.pop_front(),
            Ok(states) => states.front().cloned(),
            Err(_) => None,
        }
        .unwrap_or((QueryState::Succeeded, None));

        Ok(QueryExecution {
            query_execution_id: query_execution_id.to_string(),
            status: QueryExecutionStatus {
                state,
                state_change_reason: reason,
            },
            statistics: self.statistics.clone(),
        })
    }

    async fn get_query_results(
        &self,
        _query_execution_id: &str,
        next_token: Option<&str>,
    ) -> Result<ResultPage, EngineError> {
        let index = match next_token {
            None => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|i| i.parse::<usize>().ok())
                .ok_or_else(|| EngineError::UnexpectedResponse(format!("bad token {token}")))?,
        };

        let mut page = self.pages.get(index).cloned().unwrap_or_default();
        page.next_token = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));
        Ok(page)
    }
}
