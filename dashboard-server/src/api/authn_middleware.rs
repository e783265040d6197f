use crate::errors::ApiError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::warn;

/// Verifies the bearer token and stores the resolved [`crate::auth::User`]
/// in the request extensions for downstream handlers.
pub(super) async fn authentication_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = match request.headers().get(http::header::AUTHORIZATION) {
        Some(header) => header,
        None => {
            warn!("Missing Authorization header");
            return ApiError::unauthorized("Not authenticated").into_response();
        }
    };

    let token = match auth_header.to_str() {
        Ok(header_str) if header_str.to_lowercase().starts_with("bearer ") => {
            // Remove the "Bearer " prefix
            header_str[7..].trim().to_string()
        }
        Ok(_) => {
            warn!("Invalid Authorization header format, missing 'Bearer ' prefix");
            return ApiError::unauthorized("Invalid authentication credentials").into_response();
        }
        Err(e) => {
            warn!("Failed to parse Authorization header to string: {}", e);
            return ApiError::unauthorized("Invalid authentication credentials").into_response();
        }
    };

    match state.auth.current_user(&token) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            warn!("Authentication failed: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
