use crate::auth::User;
use crate::query::{ReportFilters, ReportType, DEFAULT_LIMIT, MAX_LIMIT};
use crate::errors::ApiError;
use athena_engine::{QueryOutcome, Row};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

/// Ad-hoc SQL submitted by a dashboard user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueryRequest {
    /// SQL text; must be a single read-only statement
    pub query: String,
    /// Overrides the configured database
    #[serde(default)]
    pub database: Option<String>,
    /// Appended as `LIMIT n` when the query has no limit of its own
    #[serde(default)]
    #[schema(minimum = 1, maximum = 10000)]
    pub limit: Option<i64>,
}

/// Result of a finished query, shared by ad-hoc and report endpoints.
///
/// `columns` are the keys of the first result row, so they are empty when no
/// rows came back; `row_count` always equals `results.len()`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QueryResponse {
    pub query_execution_id: String,
    pub status: String,
    pub data_scanned_bytes: i64,
    pub execution_time_ms: i64,
    pub row_count: usize,
    pub columns: Vec<String>,
    #[schema(value_type = Vec<Object>)]
    pub results: Vec<Row>,
}

impl From<QueryOutcome> for QueryResponse {
    fn from(outcome: QueryOutcome) -> Self {
        // Column names are only reported alongside at least one row
        let columns = if outcome.rows.is_empty() {
            Vec::new()
        } else {
            outcome.columns
        };
        Self {
            query_execution_id: outcome.query_execution_id,
            status: outcome.status.to_string(),
            data_scanned_bytes: outcome.data_scanned_bytes,
            execution_time_ms: outcome.execution_time_ms,
            row_count: outcome.rows.len(),
            columns,
            results: outcome.rows,
        }
    }
}

/// Query string parameters accepted by report execution
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportParams {
    /// Tenant to scope the report to (required by most reports)
    pub tenant_id: Option<String>,
    /// Restrict to a single user
    pub user_id: Option<String>,
    /// Care record, required by `session_lifecycle`
    pub care_record_id: Option<String>,
    /// Start date (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// End date (YYYY-MM-DD)
    pub end_date: Option<String>,
    /// Result limit, 1 to 10000 (default 1000)
    #[param(minimum = 1, maximum = 10000)]
    pub limit: Option<i64>,
}

impl ReportParams {
    pub fn into_filters(self) -> Result<ReportFilters, ApiError> {
        let limit = match self.limit {
            Some(limit) => check_limit(limit)?,
            None => DEFAULT_LIMIT,
        };
        Ok(ReportFilters {
            tenant_id: self.tenant_id,
            user_id: self.user_id,
            care_record_id: self.care_record_id,
            start_date: self.start_date,
            end_date: self.end_date,
            limit,
        })
    }
}

/// Rejects limits outside `1..=MAX_LIMIT` with 422
pub fn check_limit(limit: i64) -> Result<u32, ApiError> {
    u32::try_from(limit)
        .ok()
        .filter(|l| (1..=MAX_LIMIT).contains(l))
        .ok_or_else(|| {
            ApiError::unprocessable(format!("limit must be between 1 and {}", MAX_LIMIT))
        })
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub name: String,
    pub description: String,
    pub requires_tenant: bool,
}

impl From<ReportType> for CatalogEntry {
    fn from(report_type: ReportType) -> Self {
        let (name, description) = report_type.describe();
        Self {
            report_type,
            name: name.to_string(),
            description: description.to_string(),
            requires_tenant: report_type.requires_tenant(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogResponse {
    pub queries: Vec<CatalogEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use athena_engine::QueryState;
    use http::StatusCode;

    fn row(cells: &[(&str, Option<&str>)]) -> Row {
        cells
            .iter()
            .map(|(c, v)| (c.to_string(), v.map(str::to_string)))
            .collect()
    }

    fn outcome(rows: Vec<Row>) -> QueryOutcome {
        QueryOutcome {
            query_execution_id: "qid-1".to_string(),
            status: QueryState::Succeeded,
            data_scanned_bytes: 2048,
            execution_time_ms: 150,
            columns: vec!["tenant_id".to_string(), "sessions".to_string()],
            rows,
        }
    }

    #[test]
    fn test_query_response_reports_result_columns() {
        let response = QueryResponse::from(outcome(vec![
            row(&[("tenant_id", Some("t1")), ("sessions", Some("4"))]),
            row(&[("tenant_id", Some("t2")), ("sessions", None)]),
        ]));

        assert_eq!(response.status, "SUCCEEDED");
        assert_eq!(response.columns, vec!["tenant_id", "sessions"]);
        assert!(response.results[0].columns().eq(response.columns.iter().map(String::as_str)));
        assert_eq!(response.row_count, 2);
        assert_eq!(response.row_count, response.results.len());
    }

    #[test]
    fn test_query_response_without_rows_has_no_columns() {
        let response = QueryResponse::from(outcome(Vec::new()));
        assert!(response.columns.is_empty());
        assert_eq!(response.row_count, 0);
    }

    #[test]
    fn test_check_limit_bounds() {
        assert_eq!(check_limit(1).unwrap(), 1);
        assert_eq!(check_limit(10_000).unwrap(), 10_000);
        for limit in [0, -5, 10_001] {
            let err = check_limit(limit).unwrap_err();
            assert_eq!(err.status_code, StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn test_report_params_default_limit() {
        let filters = ReportParams {
            tenant_id: Some("t1".to_string()),
            ..Default::default()
        }
        .into_filters()
        .unwrap();
        assert_eq!(filters.limit, DEFAULT_LIMIT);
        assert_eq!(filters.tenant_id.as_deref(), Some("t1"));
    }

    #[test]
    fn test_catalog_entry_serialization() {
        let entry = CatalogEntry::from(ReportType::TopPractitioners);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "top_practitioners");
        assert_eq!(value["requires_tenant"], true);
    }
}
