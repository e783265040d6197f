use crate::api::models::{LoginRequest, TokenResponse};
use crate::errors::ApiError;
use crate::openapi::AUTH_TAG;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use log::{info, warn};

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/api/v1/auth/login", post(login_handler))
}

/// Exchange username and password for a bearer token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = AUTH_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = TokenResponse),
        (status = 401, description = "Incorrect username or password"),
        (status = 422, description = "Malformed login request"),
    )
)]
pub(crate) async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = payload.map_err(ApiError::from)?;

    let user = state
        .auth
        .authenticate(&request.username, &request.password)
        .await
        .inspect_err(|_| warn!("Failed login attempt for user {}", request.username))?;
    let access_token = state.auth.issue_token(&user)?;

    info!("User {} logged in", user.username);
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user,
    }))
}
