use crate::api::models::{check_limit, QueryRequest, QueryResponse};
use crate::auth::User;
use crate::errors::ApiError;
use crate::openapi::ANALYTICS_TAG;
use crate::query::sanitize;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Extension, Json, Router};
use log::{error, info, warn};

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/api/v1/analytics/query", post(query_handler))
}

/// Appends `LIMIT n` unless the query already mentions LIMIT anywhere
fn apply_limit(query: String, limit: Option<u32>) -> String {
    match limit {
        Some(limit) if !query.to_uppercase().contains("LIMIT") => {
            format!("{} LIMIT {}", query, limit)
        }
        _ => query,
    }
}

/// Run an ad-hoc read-only query
#[utoipa::path(
    post,
    path = "/api/v1/analytics/query",
    tag = ANALYTICS_TAG,
    request_body = QueryRequest,
    params(
        ("Authorization" = String, Header, description = "Bearer token from the login endpoint"),
    ),
    responses(
        (status = 200, description = "Query results", body = QueryResponse),
        (status = 400, description = "Query rejected by validation"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 422, description = "Malformed request or limit out of range"),
        (status = 500, description = "Query execution failed"),
    )
)]
pub(crate) async fn query_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload.map_err(ApiError::from)?;
    let limit = request.limit.map(check_limit).transpose()?;

    let query = sanitize(&request.query);
    if let Err(e) = state.validator.validate(&query) {
        warn!("Invalid query from user {}: {}", user.username, e);
        return Err(e.into());
    }
    let query = apply_limit(query, limit);

    let preview: String = query.chars().take(100).collect();
    info!("Executing query for user {}: {}...", user.username, preview);

    let outcome = state
        .executor
        .execute(&query, request.database.as_deref(), None, None)
        .await
        .map_err(|e| {
            error!("Query execution error for user {}: {}", user.username, e);
            ApiError::execution_failed(e)
        })?;

    let response = QueryResponse::from(outcome);
    info!(
        "Query completed for user {}: {} rows, {}ms",
        user.username, response.row_count, response.execution_time_ms
    );
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestFixture;
    use axum::body::Body;
    use http::{Method, StatusCode};
    use serde_json::json;

    const QUERY_URI: &str = "/api/v1/analytics/query";

    #[test]
    fn test_apply_limit() {
        assert_eq!(
            apply_limit("SELECT * FROM t".to_string(), Some(10)),
            "SELECT * FROM t LIMIT 10"
        );
        assert_eq!(
            apply_limit("SELECT * FROM t limit 5".to_string(), Some(10)),
            "SELECT * FROM t limit 5"
        );
        assert_eq!(apply_limit("SELECT 1".to_string(), None), "SELECT 1");
    }

    #[tokio::test]
    async fn test_query_success() {
        let fixture = TestFixture::new().await;
        fixture
            .mock_athena_success(
                "q-100",
                &["tenant_id", "session_count"],
                &[&["t1", "12"], &["t2", ""]],
                1,
            )
            .await;

        let response = fixture
            .post(
                QUERY_URI,
                &json!({"query": "SELECT   tenant_id,\n count(*) AS session_count FROM audittt GROUP BY tenant_id", "limit": 50}),
            )
            .await;
        response.assert_ok();

        let body = response.json_as::<serde_json::Value>();
        assert_eq!(body["query_execution_id"], "q-100");
        assert_eq!(body["status"], "SUCCEEDED");
        assert_eq!(body["data_scanned_bytes"], 4096);
        assert_eq!(body["execution_time_ms"], 250);
        assert_eq!(body["row_count"], 2);
        assert_eq!(body["columns"], json!(["tenant_id", "session_count"]));
        assert_eq!(
            body["results"],
            json!([
                {"tenant_id": "t1", "session_count": "12"},
                {"tenant_id": "t2", "session_count": null}
            ])
        );

        let submitted = fixture.athena_requests("StartQueryExecution").await;
        assert_eq!(
            submitted[0]["QueryString"],
            "SELECT tenant_id, count(*) AS session_count FROM audittt GROUP BY tenant_id LIMIT 50"
        );
        assert_eq!(submitted[0]["QueryExecutionContext"]["Database"], "clinical_audit");
        assert_eq!(submitted[0]["WorkGroup"], "primary");
    }

    #[tokio::test]
    async fn test_query_database_override() {
        let fixture = TestFixture::new().await;
        fixture.mock_athena_success("q-101", &["n"], &[], 1).await;

        let response = fixture
            .post(QUERY_URI, &json!({"query": "SELECT 1 AS n", "database": "reporting"}))
            .await;
        response.assert_ok();
        assert_eq!(response.json["row_count"], 0);
        assert_eq!(response.json["columns"], json!([]));

        let submitted = fixture.athena_requests("StartQueryExecution").await;
        assert_eq!(submitted[0]["QueryExecutionContext"]["Database"], "reporting");
        assert_eq!(submitted[0]["QueryString"], "SELECT 1 AS n");
    }

    #[tokio::test]
    async fn test_rejected_queries_never_reach_athena() {
        let fixture = TestFixture::new().await;
        fixture.expect_no_athena_calls().await;

        let cases = [
            ("   ", "Query cannot be empty"),
            ("DROP TABLE audittt", "Query contains forbidden keyword: DROP"),
            ("SELECT * FROM t; DELETE FROM t", "Query contains forbidden keyword: DELETE"),
            ("SELECT 1 -- comment", "Query contains potentially dangerous SQL patterns"),
            ("SHOW TABLES", "Only SELECT queries are allowed"),
        ];
        for (query, detail) in cases {
            let response = fixture.post(QUERY_URI, &json!({ "query": query })).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            assert_eq!(response.json["detail"], detail, "query: {query}");
        }
    }

    #[tokio::test]
    async fn test_limit_out_of_range() {
        let fixture = TestFixture::new().await;
        fixture.expect_no_athena_calls().await;

        for limit in [0, 10_001] {
            let response = fixture
                .post(QUERY_URI, &json!({"query": "SELECT 1", "limit": limit}))
                .await;
            response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[tokio::test]
    async fn test_execution_failure() {
        let fixture = TestFixture::new().await;
        fixture
            .mock_athena_failure("q-102", "SYNTAX_ERROR: line 1:8: Column 'nope' cannot be resolved")
            .await;

        let response = fixture
            .post(QUERY_URI, &json!({"query": "SELECT nope FROM audittt"}))
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json["detail"],
            "Query execution failed: Query failed: SYNTAX_ERROR: line 1:8: Column 'nope' cannot be resolved"
        );
    }

    #[tokio::test]
    async fn test_query_requires_token() {
        let fixture = TestFixture::new().await;
        fixture.expect_no_athena_calls().await;

        let response = fixture
            .post_anonymous(QUERY_URI, &json!({"query": "SELECT 1"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json["detail"], "Not authenticated");

        let request = fixture
            .anonymous_request_builder(Method::POST, QUERY_URI)
            .header("Authorization", "Bearer forged.token.value")
            .body(Body::from(r#"{"query": "SELECT 1"}"#))
            .unwrap();
        let response = fixture.send(request).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json["detail"], "Invalid authentication credentials");
    }
}
