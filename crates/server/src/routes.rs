//! HTTP routes.
//!
//! - `GET /health` reports liveness and the crate version.
//! - `POST /api/analyze` takes `{"url": "..."}` and returns the detailed
//!   analysis report.
//!
//! Failures use a uniform body: `{"error": {"code": "...", "message": "..."}}`,
//! including request bodies that are not valid JSON or lack `url`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use seoscope_core::{Analysis, AnalysisReport, Analyzer, SeoscopeError, fetch_url};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/analyze", post(handle_analyze))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: ErrorDetail { code: self.code.to_string(), message: self.message } };
        (self.status, Json(body)).into_response()
    }
}

impl From<SeoscopeError> for AppError {
    fn from(err: SeoscopeError) -> Self {
        let (status, code) = match &err {
            SeoscopeError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, "invalid_url"),
            SeoscopeError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            e if e.is_fetch_error() => (StatusCode::BAD_GATEWAY, "fetch_failed"),
            SeoscopeError::NoBodyFound | SeoscopeError::NoContent | SeoscopeError::HtmlParseError(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unreadable_page")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };
        AppError { status, code, message: err.to_string() }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok".to_string(), version: env!("CARGO_PKG_VERSION").to_string() })
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    url: String,
}

async fn handle_analyze(
    State(state): State<AppState>, payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisReport>, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError {
        status: StatusCode::BAD_REQUEST,
        code: "invalid_request",
        message: rejection.body_text(),
    })?;

    let analysis = analyze(Arc::clone(&state.analyzer), request.url.clone()).await.inspect_err(|e| {
        tracing::info!(url = %request.url, code = e.code, error = %e.message, "analysis failed");
    })?;

    tracing::info!(
        url = %request.url,
        words = analysis.features.word_count,
        similar = analysis.similar.len(),
        "analysis complete"
    );

    Ok(Json(AnalysisReport::new(&analysis, true)))
}

/// Fetches on the async runtime, then runs the CPU and file bound stages on
/// the blocking pool.
async fn analyze(analyzer: Arc<Analyzer>, url: String) -> Result<Analysis, AppError> {
    let raw = fetch_url(&url, &analyzer.config().fetch).await?;

    tokio::task::spawn_blocking(move || analyzer.analyze_html(&raw, &url))
        .await
        .map_err(|e| AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal_error",
            message: format!("analysis task failed: {e}"),
        })?
        .map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use httpmock::prelude::*;
    use seoscope_core::{AnalyzerConfig, QualityClassifier};
    use tower::ServiceExt;

    fn app() -> Router {
        let config = AnalyzerConfig::builder().timeout(2).reference_path("missing.csv").build();
        let analyzer = Analyzer::with_classifier(config, QualityClassifier::Heuristic).unwrap();
        router(AppState { analyzer: Arc::new(analyzer) })
    }

    async fn post_analyze(url: &str) -> (StatusCode, serde_json::Value) {
        post_body(serde_json::json!({ "url": url }).to_string()).await
    }

    async fn post_body(body: String) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let server = MockServer::start_async().await;
        let html = std::fs::read("../../tests/fixtures/long_article.html").unwrap();
        server
            .mock_async(|when, then| {
                when.method(GET).path("/walk");
                then.status(200).header("content-type", "text/html").body(html);
            })
            .await;

        let (status, body) = post_analyze(&server.url("/walk")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "A Long Walk Through the Garden");
        assert_eq!(body["word_count"], 2000);
        assert_eq!(body["quality_label"], "High");
        assert_eq!(body["quality_source"], "heuristic");
        assert_eq!(body["reading_level"], "Fairly Difficult (10th-12th grade level)");
    }

    #[tokio::test]
    async fn test_analyze_invalid_url() {
        let (status, body) = post_analyze("example.com/no-scheme").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_url");
    }

    #[tokio::test]
    async fn test_analyze_malformed_body() {
        let (status, body) = post_body("{not json".to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");
        assert!(!body["error"]["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_missing_url_field() {
        let (status, body) = post_body(r#"{"link": "https://example.com"}"#.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");
        assert!(body["error"]["message"].as_str().unwrap().contains("url"));
    }

    #[tokio::test]
    async fn test_analyze_upstream_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/gone");
                then.status(404);
            })
            .await;

        let (status, body) = post_analyze(&server.url("/gone")).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "fetch_failed");
        assert!(body["error"]["message"].as_str().unwrap().contains("404"));
    }

    #[tokio::test]
    async fn test_analyze_unreadable_page() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/fragment");
                then.status(200).body("<div>no landmarks here</div>");
            })
            .await;

        let (status, body) = post_analyze(&server.url("/fragment")).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "unreadable_page");
    }

    #[test]
    fn test_error_mapping() {
        let cases = [
            (SeoscopeError::Timeout { timeout: 10 }, StatusCode::GATEWAY_TIMEOUT),
            (SeoscopeError::StatusError { status: 500 }, StatusCode::BAD_GATEWAY),
            (SeoscopeError::NoContent, StatusCode::UNPROCESSABLE_ENTITY),
            (SeoscopeError::ModelError("bad".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status, expected);
        }
    }
}
