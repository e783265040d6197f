use crate::api::{analytics, auth, bi, health};
use utoipa::OpenApi;

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const AUTH_TAG: &str = "Authentication API";
pub(crate) const ANALYTICS_TAG: &str = "Analytics API";
pub(crate) const BI_TAG: &str = "BI Reports API";

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login_handler,
        analytics::query_handler,
        bi::report_handler,
        bi::catalog_handler,
    ),
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = AUTH_TAG, description = "Login and token issuance"),
        (name = ANALYTICS_TAG, description = "Ad-hoc read-only queries"),
        (name = BI_TAG, description = "Pre-built clinical audit reports"),
    ),
    info(
        title = "Athena Dashboard API",
        description = "Analytics backend for the clinical audit dashboard",
        version = "0.1.0"
    )
)]
pub(crate) struct ApiDoc;
