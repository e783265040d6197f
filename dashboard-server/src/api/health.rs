use crate::openapi::HEALTH_TAG;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Liveness response carrying the service name and version
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Health {
    status: String,
    app: String,
    version: String,
}

impl IntoResponse for Health {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Basic health check handler
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is healthy", body = Health)
    )
)]
pub(crate) async fn health_check(State(state): State<AppState>) -> Health {
    Health {
        status: "ok".to_string(),
        app: state.settings.app_name.clone(),
        version: state.settings.app_version.clone(),
    }
}

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/api/v1/health", get(health_check))
}
