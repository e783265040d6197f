use crate::QueryEngine;
use crate::error::EngineError;
use crate::models::{
    QueryExecution, QueryExecutionStatistics, QueryExecutionStatus, QueryState, ResultPage,
    ResultSet, StartQueryExecutionInput,
};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_athena::Client;
use aws_sdk_athena::config::Credentials;
use aws_sdk_athena::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_athena::types::{self, QueryExecutionContext, QueryExecutionState, ResultConfiguration};
use log::{debug, warn};
use std::time::Duration;

/// Static keys taken from configuration instead of the default provider chain
#[derive(Clone)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}

/// A builder for configuring an Athena client.
///
/// Without static credentials the SDK's default provider chain is used
/// (environment, shared profile, web identity, container and instance roles).
#[derive(Debug)]
pub struct AthenaClientBuilder {
    region: String,
    endpoint: Option<String>,
    credentials: Option<StaticCredentials>,
    timeout: Duration,
    connect_timeout: Duration,
}

impl AthenaClientBuilder {
    /// Creates a new builder for `us-east-1` using the default credential chain.
    pub fn new() -> Self {
        Self {
            region: "us-east-1".to_string(),
            endpoint: None,
            credentials: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Sets static credentials for every request.
    pub fn with_credentials(mut self, credentials: StaticCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets static credentials when both keys are configured.
    ///
    /// Anything less leaves the default provider chain in charge.
    pub fn with_optional_credentials(
        self,
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
        session_token: Option<String>,
    ) -> Self {
        let access_key_id = access_key_id.filter(|k| !k.is_empty());
        let secret_access_key = secret_access_key.filter(|k| !k.is_empty());

        match (access_key_id, secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => {
                self.with_credentials(StaticCredentials {
                    access_key_id,
                    secret_access_key,
                    session_token: session_token.filter(|t| !t.is_empty()),
                })
            }
            (None, None) => self,
            _ => {
                warn!("Ignoring incomplete static AWS credentials, using the default provider chain");
                self
            }
        }
    }

    /// Sets the AWS region of the endpoint.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Overrides the regional endpoint (used for VPC endpoints and tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the timeout of a single operation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves the SDK configuration and creates the client.
    ///
    /// Credentials from the default chain are resolved lazily, on the first
    /// request, so building never fails for lack of keys.
    pub async fn build(self) -> AthenaClient {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(self.timeout)
                    .connect_timeout(self.connect_timeout)
                    .build(),
            );

        if let Some(credentials) = self.credentials {
            loader = loader.credentials_provider(Credentials::new(
                credentials.access_key_id,
                credentials.secret_access_key,
                credentials.session_token,
                None,
                "dashboard-settings",
            ));
        } else {
            debug!("No static AWS credentials configured, using the default provider chain");
        }

        if let Some(endpoint) = &self.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let config = loader.load().await;
        AthenaClient {
            client: Client::new(&config),
            region: self.region,
            endpoint: self.endpoint,
        }
    }
}

impl Default for AthenaClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Athena SDK client exposing the three operations the executor needs.
#[derive(Clone)]
pub struct AthenaClient {
    client: Client,
    region: String,
    endpoint: Option<String>,
}

impl std::fmt::Debug for AthenaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AthenaClient")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl AthenaClient {
    pub fn builder() -> AthenaClientBuilder {
        AthenaClientBuilder::new()
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

/// Service errors keep their code; transport and dispatch failures carry the
/// full error chain.
fn sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> EngineError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.code() {
        Some(code) => EngineError::Service {
            code: code.to_string(),
            message: err.message().unwrap_or_default().to_string(),
        },
        None => EngineError::Sdk(format!("{operation}: {}", DisplayErrorContext(&err))),
    }
}

fn query_state(state: Option<&QueryExecutionState>) -> Result<QueryState, EngineError> {
    match state {
        Some(QueryExecutionState::Queued) => Ok(QueryState::Queued),
        Some(QueryExecutionState::Running) => Ok(QueryState::Running),
        Some(QueryExecutionState::Succeeded) => Ok(QueryState::Succeeded),
        Some(QueryExecutionState::Failed) => Ok(QueryState::Failed),
        Some(QueryExecutionState::Cancelled) => Ok(QueryState::Cancelled),
        other => Err(EngineError::UnexpectedResponse(format!(
            "unknown query state {other:?}"
        ))),
    }
}

fn query_execution(execution: &types::QueryExecution) -> Result<QueryExecution, EngineError> {
    let status = execution.status();
    let statistics = execution.statistics();

    Ok(QueryExecution {
        query_execution_id: execution.query_execution_id().unwrap_or_default().to_string(),
        status: QueryExecutionStatus {
            state: query_state(status.and_then(|s| s.state()))?,
            state_change_reason: status
                .and_then(|s| s.state_change_reason())
                .map(str::to_string),
        },
        statistics: QueryExecutionStatistics {
            data_scanned_in_bytes: statistics
                .and_then(|s| s.data_scanned_in_bytes())
                .unwrap_or_default(),
            engine_execution_time_in_millis: statistics
                .and_then(|s| s.engine_execution_time_in_millis())
                .unwrap_or_default(),
        },
    })
}

fn result_set(result_set: Option<&types::ResultSet>) -> ResultSet {
    let Some(result_set) = result_set else {
        return ResultSet::default();
    };

    ResultSet {
        columns: result_set
            .result_set_metadata()
            .map(|m| m.column_info().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default(),
        rows: result_set
            .rows()
            .iter()
            .map(|row| {
                row.data()
                    .iter()
                    .map(|datum| datum.var_char_value().map(str::to_string))
                    .collect()
            })
            .collect(),
    }
}

#[async_trait]
impl QueryEngine for AthenaClient {
    async fn start_query_execution(
        &self,
        input: StartQueryExecutionInput,
    ) -> Result<String, EngineError> {
        debug!("Submitting query to workgroup {}", input.work_group);
        let output = self
            .client
            .start_query_execution()
            .query_string(input.query_string)
            .query_execution_context(
                QueryExecutionContext::builder()
                    .database(input.database)
                    .build(),
            )
            .work_group(input.work_group)
            .set_result_configuration(input.output_location.map(|location| {
                ResultConfiguration::builder()
                    .output_location(location)
                    .build()
            }))
            .send()
            .await
            .map_err(|e| sdk_error("StartQueryExecution", e))?;

        output
            .query_execution_id()
            .map(str::to_string)
            .ok_or_else(|| {
                EngineError::UnexpectedResponse("StartQueryExecution returned no id".to_string())
            })
    }

    async fn get_query_execution(
        &self,
        query_execution_id: &str,
    ) -> Result<QueryExecution, EngineError> {
        let output = self
            .client
            .get_query_execution()
            .query_execution_id(query_execution_id)
            .send()
            .await
            .map_err(|e| sdk_error("GetQueryExecution", e))?;

        let execution = output.query_execution().ok_or_else(|| {
            EngineError::UnexpectedResponse(format!(
                "GetQueryExecution returned nothing for {query_execution_id}"
            ))
        })?;
        query_execution(execution)
    }

    async fn get_query_results(
        &self,
        query_execution_id: &str,
        next_token: Option<&str>,
    ) -> Result<ResultPage, EngineError> {
        let output = self
            .client
            .get_query_results()
            .query_execution_id(query_execution_id)
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| sdk_error("GetQueryResults", e))?;

        Ok(ResultPage {
            result_set: result_set(output.result_set()),
            next_token: output.next_token().map(str::to_string),
        })
    }
}
