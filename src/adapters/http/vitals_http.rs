//! Vitals HTTP Server.
//!
//! JSON endpoints for recording subjects and readings and for reading the
//! cached latest-reading aggregate.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domain::errors::DomainError;
use crate::domain::models::{
    LatestReadingRow, NewReading, NewSubject, Reading, ReadingFilter, ServerConfig, Subject,
};
use crate::infrastructure::context::{Aggregate, AppContext, Records};

/// Configuration for the vitals HTTP server.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable CORS.
    pub enable_cors: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for HttpConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            enable_cors: config.enable_cors,
        }
    }
}

/// Query parameters for listing readings.
#[derive(Debug, Deserialize)]
pub struct ReadingQueryParams {
    /// Only readings of this subject
    #[serde(default)]
    pub subject_id: Option<i64>,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Stable machine-readable code
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Shared state for the HTTP server.
struct AppState {
    aggregate: Arc<Aggregate>,
    records: Arc<Records>,
}

/// Vitals HTTP Server.
pub struct VitalsHttpServer {
    config: HttpConfig,
    context: AppContext,
}

impl VitalsHttpServer {
    /// Server over an existing context.
    pub fn new(context: AppContext, config: HttpConfig) -> Self {
        Self { config, context }
    }

    /// Build the router.
    pub fn build_router(&self) -> Router {
        let state = Arc::new(AppState {
            aggregate: self.context.aggregate.clone(),
            records: self.context.records.clone(),
        });

        let app = Router::new()
            // Subjects
            .route("/api/v1/subjects", get(list_subjects).post(create_subject))
            .route("/api/v1/subjects/{id}", get(get_subject))
            .route("/api/v1/subjects/{id}/readings", post(add_reading))
            // Readings
            .route("/api/v1/readings", get(list_readings))
            // Aggregates
            .route("/api/v1/stats/latest", get(latest_readings))
            // Health check
            .route("/health", get(health_check))
            .with_state(state);

        if self.config.enable_cors {
            app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
                .layer(TraceLayer::new_for_http())
        } else {
            app.layer(TraceLayer::new_for_http())
        }
    }

    /// Start the server.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let router = self.build_router();

        tracing::info!("vitals HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

// Handler functions

async fn health_check() -> &'static str {
    "OK"
}

async fn list_subjects(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Subject>>, ApiError> {
    state.records.list_subjects().await.map(Json).map_err(api_error)
}

async fn create_subject(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewSubject>, JsonRejection>,
) -> Result<(StatusCode, Json<Subject>), ApiError> {
    let Json(request) = payload.map_err(body_error)?;
    let subject = state.records.create_subject(request).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(subject)))
}

async fn get_subject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Subject>, ApiError> {
    match state.records.get_subject(id).await.map_err(api_error)? {
        Some(subject) => Ok(Json(subject)),
        None => Err(api_error(DomainError::SubjectNotFound(id))),
    }
}

async fn add_reading(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<NewReading>, JsonRejection>,
) -> Result<(StatusCode, Json<Reading>), ApiError> {
    let Json(request) = payload.map_err(body_error)?;
    let reading = state.records.add_reading(id, request).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(reading)))
}

async fn list_readings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReadingQueryParams>,
) -> Result<Json<Vec<Reading>>, ApiError> {
    let filter = ReadingFilter {
        subject_id: params.subject_id,
    };
    state.records.list_readings(filter).await.map(Json).map_err(api_error)
}

async fn latest_readings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LatestReadingRow>>, ApiError> {
    state.aggregate.latest_per_subject().await.map(Json).map_err(api_error)
}

fn api_error(err: DomainError) -> ApiError {
    let (status, code) = match &err {
        DomainError::SubjectNotFound(_) => (StatusCode::NOT_FOUND, "SUBJECT_NOT_FOUND"),
        DomainError::ValidationFailed(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_FAILED"),
        DomainError::RetrievalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "RETRIEVAL_ERROR"),
        DomainError::StoreUnavailable(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_UNAVAILABLE"),
        DomainError::CacheUnavailable(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CACHE_UNAVAILABLE"),
        DomainError::SerializationError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_ERROR"),
    };

    if status.is_server_error() {
        tracing::error!(error = %err, code, "request failed");
    }

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: code.to_string(),
        }),
    )
}

/// Malformed or mistyped request bodies, in the same shape as domain errors.
fn body_error(rejection: JsonRejection) -> ApiError {
    (
        rejection.status(),
        Json(ErrorResponse {
            error: rejection.body_text(),
            code: "INVALID_BODY".to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::domain::models::Config;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    async fn test_server() -> VitalsHttpServer {
        let pool = create_migrated_test_pool().await.unwrap();
        let context = AppContext::with_pool(pool, &Config::default());
        VitalsHttpServer::new(context, HttpConfig::default())
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send_raw(router: &Router, uri: &str, body: &'static str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn parse<T: DeserializeOwned>(bytes: &[u8]) -> T {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let router = test_server().await.build_router();
        let (status, body) = send(&router, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
    }

    #[tokio::test]
    async fn test_write_then_read_latest() {
        let router = test_server().await.build_router();

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/v1/subjects",
            Some(serde_json::json!({"name": "Alice Smith", "date_of_birth": "1980-05-12", "gender": "F"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let alice: Subject = parse(&body);

        let (status, _) = send(&router, Method::GET, "/api/v1/stats/latest", None).await;
        assert_eq!(status, StatusCode::OK);

        for (systolic, at) in [(120, "2024-02-01T07:00:00Z"), (135, "2024-02-02T07:00:00Z")] {
            let (status, _) = send(
                &router,
                Method::POST,
                &format!("/api/v1/subjects/{}/readings", alice.id),
                Some(serde_json::json!({"systolic": systolic, "diastolic": 85, "recorded_at": at})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(&router, Method::GET, "/api/v1/stats/latest", None).await;
        assert_eq!(status, StatusCode::OK);
        let rows: Vec<LatestReadingRow> = parse(&body);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Alice Smith");
        assert_eq!(rows[0].systolic, 135);

        let (status, body) = send(
            &router,
            Method::GET,
            &format!("/api/v1/readings?subject_id={}", alice.id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse::<Vec<Reading>>(&body).len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_subject_is_404() {
        let router = test_server().await.build_router();

        let (status, body) = send(&router, Method::GET, "/api/v1/subjects/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(parse::<ErrorResponse>(&body).code, "SUBJECT_NOT_FOUND");

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/v1/subjects/999/readings",
            Some(serde_json::json!({"systolic": 120, "diastolic": 80})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(parse::<ErrorResponse>(&body).code, "SUBJECT_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_out_of_range_reading_is_422() {
        let router = test_server().await.build_router();
        let (_, body) = send(
            &router,
            Method::POST,
            "/api/v1/subjects",
            Some(serde_json::json!({"name": "Bob Jones", "date_of_birth": "1975-01-03"})),
        )
        .await;
        let bob: Subject = parse(&body);

        let (status, body) = send(
            &router,
            Method::POST,
            &format!("/api/v1/subjects/{}/readings", bob.id),
            Some(serde_json::json!({"systolic": 400, "diastolic": 80})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(parse::<ErrorResponse>(&body).code, "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_shape() {
        let router = test_server().await.build_router();

        let (status, body) = send_raw(&router, "/api/v1/subjects", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parse::<ErrorResponse>(&body).code, "INVALID_BODY");

        let (status, body) = send_raw(&router, "/api/v1/subjects/1/readings", r#"{"systolic": "high"}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let error: ErrorResponse = parse(&body);
        assert_eq!(error.code, "INVALID_BODY");
        assert!(!error.error.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_500() {
        let server = test_server().await;
        let router = server.build_router();
        server.context.pool.close().await;

        let (status, body) = send(&router, Method::GET, "/api/v1/stats/latest", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let error: ErrorResponse = parse(&body);
        assert_eq!(error.code, "RETRIEVAL_ERROR");
        assert!(error.error.starts_with("Failed to retrieve latest readings"));
    }
}
