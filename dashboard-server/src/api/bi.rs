use crate::api::models::{CatalogEntry, CatalogResponse, QueryResponse, ReportParams};
use crate::auth::User;
use crate::errors::ApiError;
use crate::openapi::BI_TAG;
use crate::query::ReportType;
use crate::state::AppState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use log::{error, info, warn};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/bi/query/{report_type}", get(report_handler))
        .route("/api/v1/bi/queries", get(catalog_handler))
}

/// Run a pre-built report
#[utoipa::path(
    get,
    path = "/api/v1/bi/query/{report_type}",
    tag = BI_TAG,
    params(
        ("report_type" = ReportType, Path, description = "Report to run"),
        ReportParams,
        ("Authorization" = String, Header, description = "Bearer token from the login endpoint"),
    ),
    responses(
        (status = 200, description = "Report results", body = QueryResponse),
        (status = 400, description = "Missing required parameter or invalid filter"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 422, description = "Unknown report type or limit out of range"),
        (status = 500, description = "Query execution failed"),
    )
)]
pub(crate) async fn report_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(report_type): Path<String>,
    params: Result<Query<ReportParams>, QueryRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let report: ReportType = report_type.parse().map_err(ApiError::unprocessable)?;
    let Query(params) = params.map_err(ApiError::from)?;
    let filters = params.into_filters()?;

    let query = state.reports.prepare(report, &filters).map_err(|e| {
        warn!("Rejected {} report for user {}: {}", report, user.username, e);
        ApiError::from(e)
    })?;

    info!("Executing BI query '{}' for user {}", report, user.username);
    let outcome = state
        .executor
        .execute(&query, None, None, None)
        .await
        .map_err(|e| {
            error!("BI query execution error: {}", e);
            ApiError::execution_failed(e)
        })?;

    Ok(Json(QueryResponse::from(outcome)))
}

/// List every report with its description and tenant requirement
#[utoipa::path(
    get,
    path = "/api/v1/bi/queries",
    tag = BI_TAG,
    params(
        ("Authorization" = String, Header, description = "Bearer token from the login endpoint"),
    ),
    responses(
        (status = 200, description = "Report catalog", body = CatalogResponse),
        (status = 401, description = "Missing or invalid bearer token"),
    )
)]
pub(crate) async fn catalog_handler() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        queries: ReportType::ALL.into_iter().map(CatalogEntry::from).collect(),
    })
}
