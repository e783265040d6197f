//! Query text handling: validation of ad-hoc SQL and the report template catalog.

mod builder;
mod reports;
mod templates;
mod validator;

pub use builder::{ReportFilters, TemplateBuilder};
pub use reports::{ReportCatalog, ReportType, DEFAULT_LIMIT, MAX_LIMIT};
pub use validator::{sanitize, QueryValidator};

use thiserror::Error;

/// Reasons a query is rejected before it reaches the engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Query cannot be empty")]
    Empty,

    #[error("Query contains forbidden keyword: {0}")]
    ForbiddenKeyword(&'static str),

    #[error("Query contains potentially dangerous SQL patterns")]
    DangerousPattern,

    #[error("Only SELECT queries are allowed")]
    NotSelect,

    #[error("{param} is required for {report} query")]
    MissingParameter {
        param: &'static str,
        report: &'static str,
    },

    #[error("Missing value for query parameter: {0}")]
    MissingPlaceholder(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}
