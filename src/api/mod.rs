//! slsframe REST API
//!
//! HTTP host surface built with Axum.
//!
//! # Endpoints
//!
//! ## Query
//! - `POST /api/v1/query` - Execute a batch of queries
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use slsframe::api::{serve, AppState};
//! use slsframe::config::Config;
//! use slsframe::query::QueryExecutor;
//! use slsframe::source::FileSource;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let source = Arc::new(FileSource::new("./data", "demo", "access"));
//!     let executor = Arc::new(QueryExecutor::new(source));
//!
//!     serve(AppState::new(executor, config.api.clone()), &config.api).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/query", post(routes::query::execute_batch))
        .layer(DefaultBodyLimit::max(state.config.max_body_size));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if allowed.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("slsframe API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("slsframe API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::RawRecord;
    use crate::query::QueryExecutor;
    use crate::source::{LogSource, MemorySource};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn record(fields: &[(&str, &str)]) -> RawRecord {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn create_test_app(source: Arc<dyn LogSource>) -> Router {
        let executor = Arc::new(QueryExecutor::new(source));
        build_router(AppState::new(executor, ApiConfig::default()))
    }

    fn healthy_app() -> Router {
        create_test_app(Arc::new(MemorySource::new(vec![
            record(&[("time", "2023-01-01 10:00:00"), ("host", "a"), ("code", "200")]),
            record(&[("time", "2023-01-01 10:00:01"), ("host", "b"), ("code", "500")]),
        ])))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_query(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/query")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let response = healthy_app().oneshot(get("/health/live")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let response = healthy_app().oneshot(get("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let app = create_test_app(Arc::new(MemorySource::failing("Unauthorized")));
        let response = app.oneshot(get("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_full() {
        let response = healthy_app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["source"], "memory");
        assert_eq!(json["message"], "Data source is working");
    }

    #[tokio::test]
    async fn test_query_batch() {
        let body = r#"{
            "queries": [
                {
                    "refId": "A",
                    "json": {"queryText": "*", "format": "Table"},
                    "timeRange": {"from": "2023-01-01T00:00:00Z", "to": "2023-01-02T00:00:00Z"}
                },
                {
                    "refId": "B",
                    "json": {"queryText": "*", "timezone": "Mars/Base"},
                    "timeRange": {"from": "2023-01-01T00:00:00Z", "to": "2023-01-02T00:00:00Z"}
                }
            ]
        }"#;

        let response = healthy_app().oneshot(post_query(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let a = &json["responses"]["A"];
        assert!(a.get("error").is_none());
        assert_eq!(a["frames"][0]["meta"]["shape"], "table");
        assert_eq!(a["frames"][0]["fields"][0]["name"], "code");
        assert_eq!(a["frames"][0]["fields"][1]["values"][1], "b");

        let b = &json["responses"]["B"];
        assert!(b["error"].as_str().unwrap().contains("unknown timezone"));
    }

    #[tokio::test]
    async fn test_query_invalid_json() {
        let response = healthy_app().oneshot(post_query("not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_duplicate_ref_id() {
        let body = r#"{
            "queries": [
                {"refId": "A", "timeRange": {"from": "2023-01-01T00:00:00Z", "to": "2023-01-02T00:00:00Z"}},
                {"refId": "A", "timeRange": {"from": "2023-01-01T00:00:00Z", "to": "2023-01-02T00:00:00Z"}}
            ]
        }"#;

        let response = healthy_app().oneshot(post_query(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }
}
