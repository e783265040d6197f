use crate::QueryEngine;
use crate::error::EngineError;
use crate::models::QueryExecution;
use log::debug;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::time::sleep;

/// Polls the execution status until it reaches a terminal state.
///
/// The status is checked first and the deadline second, so a query that
/// completes during the final interval is still reported as complete.
/// Each status call holds one worker permit; the sleep between polls does not.
pub async fn wait_for_completion(
    engine: &dyn QueryEngine,
    permits: &Semaphore,
    query_execution_id: &str,
    poll_interval: Duration,
    max_wait: Duration,
) -> Result<QueryExecution, EngineError> {
    let start = Instant::now();

    loop {
        let execution = {
            let _permit = permits.acquire().await.map_err(|_| EngineError::PoolClosed)?;
            engine.get_query_execution(query_execution_id).await?
        };

        let state = execution.status.state;
        if state.is_terminal() {
            debug!("Query {} reached {}", query_execution_id, state);
            return Ok(execution);
        }

        if start.elapsed() >= max_wait {
            return Err(EngineError::Timeout(max_wait));
        }

        debug!("Query {} is {}, polling again", query_execution_id, state);
        sleep(poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_engine::MockEngine;
    use crate::models::QueryState;

    #[tokio::test]
    async fn test_returns_first_terminal_state() {
        let engine = MockEngine::new("qid").with_states([
            QueryState::Queued,
            QueryState::Running,
            QueryState::Succeeded,
        ]);
        let permits = Semaphore::new(1);

        let execution = wait_for_completion(
            &engine,
            &permits,
            "qid",
            Duration::from_millis(1),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert_eq!(execution.status.state, QueryState::Succeeded);
        assert_eq!(engine.poll_count(), 3);
    }

    #[tokio::test]
    async fn test_times_out_while_running() {
        let engine = MockEngine::new("qid").with_states([QueryState::Running]);
        let permits = Semaphore::new(1);

        let err = wait_for_completion(
            &engine,
            &permits,
            "qid",
            Duration::from_millis(5),
            Duration::from_millis(30),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, EngineError::Timeout(d) if d == Duration::from_millis(30)));
        assert!(engine.poll_count() >= 2);
    }

    #[tokio::test]
    async fn test_zero_wait_still_checks_once() {
        let engine = MockEngine::new("qid");
        let permits = Semaphore::new(1);

        let execution = wait_for_completion(
            &engine,
            &permits,
            "qid",
            Duration::from_millis(5),
            Duration::ZERO,
        )
        .await
        .unwrap();
        assert_eq!(execution.status.state, QueryState::Succeeded);
    }
}
