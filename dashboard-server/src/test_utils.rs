use crate::auth::{Role, User};
use crate::config::Settings;
use crate::create_app;
use crate::state::AppState;
use axum::body::Body;
use axum::Router;
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

/// Test fixture for exercising the full router against a mocked Athena endpoint.
///
/// The fixture starts a wiremock server that stands in for the Athena endpoint,
/// builds settings and state pointing at it, and signs in as the configured
/// admin so requests carry a valid bearer token by default.
///
/// # Examples
///
/// ```rust
/// #[tokio::test]
/// async fn test_endpoint() {
///     let fixture = TestFixture::new().await;
///
///     // Script a successful execution with one data row
///     fixture
///         .mock_athena_success("q-1", &["tenant_id"], &[&["t1"]], 1)
///         .await;
///
///     let response = fixture
///         .post("/api/v1/analytics/query", &json!({"query": "SELECT tenant_id FROM audittt"}))
///         .await;
///
///     response.assert_ok();
///     assert_eq!(response.json["row_count"], 1);
/// }
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Configuration settings
    pub settings: Settings,
    /// Mock server for the Athena API
    pub athena_mock: MockServer,
    /// Bearer token issued to the configured admin
    pub token: String,
}

impl TestFixture {
    /// Creates a new test fixture backed by a fresh Athena mock server.
    ///
    /// This method sets up:
    /// - A mock server for the Athena API
    /// - Application settings configured to use the mock server
    /// - The application router with its state
    /// - A bearer token for the admin user
    pub async fn new() -> Self {
        Self::setup_logger(LevelFilter::Debug);

        let athena_mock = MockServer::start().await;
        let settings = Settings::for_test_with_mocks(&athena_mock);

        let state = AppState::new(settings.clone())
            .await
            .expect("Failed to create test state");
        let admin = User {
            username: settings.admin.username.clone(),
            email: settings.admin.email.clone(),
            role: Role::Admin,
        };
        let token = state
            .auth
            .issue_token(&admin)
            .expect("Failed to issue test token");
        let app = create_app(state).await;

        Self {
            app,
            settings,
            athena_mock,
            token,
        }
    }

    /// Initializes the test logger with customized settings.
    ///
    /// Called by `TestFixture::new()` at debug level; only call it directly
    /// when a test needs a different level.
    pub fn setup_logger(level: LevelFilter) {
        let _ = env_logger::builder()
            .filter_level(level)
            .is_test(true)
            .try_init();
    }

    /// Creates a request builder with the admin bearer token and a JSON
    /// content type.
    pub fn request_builder(&self, method: Method, uri: impl AsRef<str>) -> http::request::Builder {
        self.anonymous_request_builder(method, uri)
            .header("Authorization", format!("Bearer {}", self.token))
    }

    /// Creates a request builder without any credentials
    pub fn anonymous_request_builder(
        &self,
        method: Method,
        uri: impl AsRef<str>,
    ) -> http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri.as_ref())
            .header("Content-Type", "application/json")
    }

    /// Sends an authenticated GET request to the specified URI.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let response = fixture.get("/api/v1/bi/queries").await;
    /// response.assert_ok();
    /// ```
    pub async fn get(&self, uri: impl AsRef<str>) -> TestResponse {
        let request = self
            .request_builder(Method::GET, uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a GET request without an Authorization header
    pub async fn get_anonymous(&self, uri: impl AsRef<str>) -> TestResponse {
        let request = self
            .anonymous_request_builder(Method::GET, uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends an authenticated POST request with a JSON body.
    pub async fn post<T: Serialize>(&self, uri: impl AsRef<str>, body: &T) -> TestResponse {
        let json_body = serde_json::to_vec(body).expect("Failed to serialize body to JSON");
        let request = self
            .request_builder(Method::POST, uri)
            .body(Body::from(json_body))
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a POST request with a JSON body and no Authorization header.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let response = fixture
    ///     .post_anonymous("/api/v1/auth/login", &json!({"username": "admin", "password": "admin123"}))
    ///     .await;
    /// response.assert_ok();
    /// ```
    pub async fn post_anonymous<T: Serialize>(
        &self,
        uri: impl AsRef<str>,
        body: &T,
    ) -> TestResponse {
        let json_body = serde_json::to_vec(body).expect("Failed to serialize body to JSON");
        let request = self
            .anonymous_request_builder(Method::POST, uri)
            .body(Body::from(json_body))
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a request and returns a TestResponse.
    ///
    /// Lower-level than `get()` and `post()`; use it when a test needs full
    /// control over the request, such as a custom Authorization header.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        // Try to parse as JSON, defaulting to empty object if parsing fails or empty body
        let json = if !body.is_empty() {
            serde_json::from_slice(&body).unwrap_or_else(|_| json!({}))
        } else {
            json!({})
        };

        TestResponse {
            status,
            headers,
            json,
        }
    }

    /// Mounts an Athena operation mock matched on its `X-Amz-Target` header.
    ///
    /// # Parameters
    ///
    /// - `operation`: The Athena operation, e.g. `StartQueryExecution`
    /// - `response_body`: The JSON response body to return
    /// - `status_code`: HTTP status code for the response
    /// - `expected_calls`: Number of expected calls to this mock
    pub async fn add_athena_mock(
        &self,
        operation: &str,
        response_body: impl Serialize,
        status_code: StatusCode,
        expected_calls: u64,
    ) {
        Mock::given(matchers::method("POST"))
            .and(matchers::header(
                "x-amz-target",
                format!("AmazonAthena.{operation}").as_str(),
            ))
            .respond_with(ResponseTemplate::new(status_code.as_u16()).set_body_json(response_body))
            .expect(expected_calls)
            .mount(&self.athena_mock)
            .await;
    }

    /// Scripts a query that succeeds immediately and returns one result page.
    ///
    /// The page starts with the header row, as Athena sends it. `expected_runs`
    /// is the number of queries the test expects to submit.
    pub async fn mock_athena_success(
        &self,
        execution_id: &str,
        columns: &[&str],
        rows: &[&[&str]],
        expected_runs: u64,
    ) {
        let to_row = |cells: &[&str]| {
            json!({
                "Data": cells.iter().map(|c| json!({ "VarCharValue": c })).collect::<Vec<_>>()
            })
        };
        let mut result_rows = vec![to_row(columns)];
        result_rows.extend(rows.iter().map(|r| to_row(r)));

        self.add_athena_mock(
            "StartQueryExecution",
            json!({ "QueryExecutionId": execution_id }),
            StatusCode::OK,
            expected_runs,
        )
        .await;
        self.add_athena_mock(
            "GetQueryExecution",
            json!({
                "QueryExecution": {
                    "QueryExecutionId": execution_id,
                    "Status": { "State": "SUCCEEDED" },
                    "Statistics": { "DataScannedInBytes": 4096, "EngineExecutionTimeInMillis": 250 }
                }
            }),
            StatusCode::OK,
            expected_runs,
        )
        .await;
        self.add_athena_mock(
            "GetQueryResults",
            json!({
                "ResultSet": {
                    "ResultSetMetadata": {
                        "ColumnInfo": columns.iter().map(|c| json!({ "Name": c, "Type": "varchar" })).collect::<Vec<_>>()
                    },
                    "Rows": result_rows
                }
            }),
            StatusCode::OK,
            expected_runs,
        )
        .await;
    }

    /// Scripts a query that ends in the FAILED state with the given reason
    pub async fn mock_athena_failure(&self, execution_id: &str, reason: &str) {
        self.add_athena_mock(
            "StartQueryExecution",
            json!({ "QueryExecutionId": execution_id }),
            StatusCode::OK,
            1,
        )
        .await;
        self.add_athena_mock(
            "GetQueryExecution",
            json!({
                "QueryExecution": {
                    "QueryExecutionId": execution_id,
                    "Status": { "State": "FAILED", "StateChangeReason": reason }
                }
            }),
            StatusCode::OK,
            1,
        )
        .await;
    }

    /// Fails the test on drop if anything reaches the Athena mock
    pub async fn expect_no_athena_calls(&self) {
        Mock::given(matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.athena_mock)
            .await;
    }

    /// Requests received by the Athena mock for the given operation, as JSON
    pub async fn athena_requests(&self, operation: &str) -> Vec<Value> {
        let target = format!("AmazonAthena.{operation}");
        self.athena_mock
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| {
                r.headers
                    .get("x-amz-target")
                    .is_some_and(|v| v.to_str().unwrap_or_default() == target)
            })
            .map(|r| serde_json::from_slice(&r.body).unwrap_or_else(|_| json!({})))
            .collect()
    }
}

/// Response from a test request that provides convenient access to status and JSON body.
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body as JSON (if present and valid JSON)
    pub json: Value,
}

impl TestResponse {
    /// Asserts that the response has the expected status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match the expected value.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {} with body: {}",
            expected,
            self.status,
            serde_json::to_string_pretty(&self.json).unwrap_or_default()
        );
        self
    }

    /// Asserts that the response status is OK (200).
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    /// Returns a header value as a string, if present
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Converts the response body to the specified type.
    ///
    /// # Panics
    ///
    /// Panics if the JSON cannot be deserialized to the specified type.
    pub fn json_as<T: DeserializeOwned>(&self) -> T {
        serde_json::from_value(self.json.clone()).unwrap_or_else(|e| {
            panic!(
                "Failed to deserialize response: {}\nResponse body: {}",
                e,
                serde_json::to_string_pretty(&self.json).unwrap_or_default()
            )
        })
    }
}
