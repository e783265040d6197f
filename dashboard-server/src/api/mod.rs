pub(crate) mod analytics;
pub(crate) mod auth;
mod authn_middleware;
pub(crate) mod bi;
pub(crate) mod health;
pub(crate) mod models;

use crate::api::authn_middleware::authentication_middleware;
use crate::state::AppState;
use axum::{middleware, Router};

/// Combines all API routes into a single router
pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(protected_routes(state))
}

/// Creates a router for routes that require a bearer token
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(analytics::router())
        .merge(bi::router())
        // route_layer keeps unmatched paths at 404 instead of 401
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_middleware,
        ))
}
