use crate::auth::{AuthService, StaticUserStore, TokenService};
use crate::config::Settings;
use crate::query::{QueryValidator, ReportCatalog, TemplateBuilder};
use athena_engine::{AthenaClient, QueryEngine, QueryExecutor};
use std::io::{Error, ErrorKind};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub auth: AuthService,
    pub validator: Arc<QueryValidator>,
    pub reports: Arc<ReportCatalog>,
    pub executor: QueryExecutor,
}

impl AppState {
    /// Builds the state with an Athena SDK client
    pub async fn new(settings: Settings) -> Result<Self, Error> {
        let engine = Arc::new(Self::create_athena_client(&settings).await);
        Self::with_engine(settings, engine)
    }

    /// Builds the state around any query engine
    pub fn with_engine(settings: Settings, engine: Arc<dyn QueryEngine>) -> Result<Self, Error> {
        let validator = QueryValidator::new().map_err(|e| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("Failed to compile query validator: {}", e),
            )
        })?;
        let builder = TemplateBuilder::new(settings.athena.table.clone()).map_err(|e| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("Failed to create template builder: {}", e),
            )
        })?;

        let tokens = TokenService::new(
            &settings.jwt.secret_key,
            chrono::Duration::minutes(settings.jwt.expiration_minutes as i64),
        );
        let users = Arc::new(StaticUserStore::from_config(&settings.admin));
        let executor = QueryExecutor::new(engine, settings.athena.executor_config());

        Ok(Self {
            auth: AuthService::new(users, tokens),
            reports: Arc::new(ReportCatalog::new(builder, validator.clone())),
            validator: Arc::new(validator),
            executor,
            settings: Arc::new(settings),
        })
    }

    async fn create_athena_client(settings: &Settings) -> AthenaClient {
        let athena = &settings.athena;
        let mut builder = AthenaClient::builder()
            .with_region(&athena.region)
            .with_timeout(Duration::from_secs(athena.client_timeout))
            .with_optional_credentials(
                athena.access_key_id.clone(),
                athena.secret_access_key.clone(),
                athena.session_token.clone(),
            );

        if let Some(endpoint) = athena.endpoint.as_deref().filter(|e| !e.is_empty()) {
            builder = builder.with_endpoint(endpoint);
        }

        builder.build().await
    }
}
