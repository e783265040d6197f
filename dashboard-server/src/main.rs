mod api;
mod auth;
mod config;
mod errors;
mod openapi;
mod query;
mod state;
#[cfg(test)]
mod test_utils;

use crate::config::cors::CorsConfig;
use crate::state::AppState;
use axum::Router;
use http::HeaderValue;
use log::{error, info, warn};
use std::net::SocketAddr;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[tokio::main]
async fn main() {
    // Load configuration, then initialize logging (debug mode lowers the default level)
    let settings = config::Settings::new();
    let default_filter = match &settings {
        Ok(settings) if settings.debug => "debug",
        _ => "info",
    };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(default_filter));

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    let port = settings.port;

    // Initialize application state
    let state = match AppState::new(settings).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            std::process::exit(1);
        }
    };

    let app = create_app(state).await;

    // Build server address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    // Start server
    let server = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Start the server and wait for it to finish
    info!("Server running on {}, press Ctrl+C to stop", addr);
    let serve = axum::serve(server, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = serve {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Create a new application instance with a given state
pub async fn create_app(state: AppState) -> Router {
    // Create OpenAPI documentation
    let (openapi_router, api_doc) =
        OpenApiRouter::with_openapi(openapi::ApiDoc::openapi()).split_for_parts();
    let cors = cors_layer(&state.settings.cors);

    Router::new()
        .merge(api::router(&state))
        .merge(openapi_router)
        .merge(Scalar::with_url("/scalar", api_doc))
        .with_state(state)
        .layer(cors)
}

/// Allows the configured origins with credentials, mirroring the requested
/// methods and headers back to the browser.
///
/// A `*` entry echoes any request origin, since a literal wildcard cannot be
/// combined with credentials.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let allowed = config.allowed_origins();
    let allow_origin = if allowed.iter().any(|origin| origin == "*") {
        warn!("CORS allows any origin with credentials");
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = allowed
            .into_iter()
            .filter_map(|origin| match HeaderValue::from_str(&origin) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Ignoring invalid CORS origin {}: {}", origin, e);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

// Simple signal handler that works on all platforms
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestFixture;
    use axum::body::Body;
    use axum::routing::get;
    use http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_cors_preflight_allows_configured_origin() {
        let fixture = TestFixture::new().await;

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/analytics/query")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
            .body(Body::empty())
            .unwrap();
        let response = fixture.send(request).await;

        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.header("access-control-allow-origin").as_deref(),
            Some("http://localhost:5173")
        );
        assert_eq!(
            response.header("access-control-allow-credentials").as_deref(),
            Some("true")
        );
        assert_eq!(
            response.header("access-control-allow-methods").as_deref(),
            Some("POST")
        );
    }

    #[tokio::test]
    async fn test_cors_ignores_unknown_origin() {
        let fixture = TestFixture::new().await;

        let request = fixture
            .anonymous_request_builder(Method::GET, "/api/v1/health")
            .header(header::ORIGIN, "http://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = fixture.send(request).await;

        response.assert_ok();
        assert!(response.header("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn test_cors_wildcard_mirrors_request_origin() {
        let config = CorsConfig {
            origins: vec![" * ".to_string()],
        };
        let app: Router = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(cors_layer(&config));

        let request = Request::builder()
            .uri("/ping")
            .header(header::ORIGIN, "https://dashboard.example.org")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://dashboard.example.org"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }
}
