pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::assessment::handlers::handle_analyze;
use crate::document::handlers::handle_text_to_docx;
use crate::extraction::handlers::handle_extract_text;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/analyze", post(handle_analyze))
        .route("/extract/text", post(handle_extract_text))
        .route("/text/to/docx", post(handle_text_to_docx))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::assessment::test_support::ScriptedModel;

    #[tokio::test]
    async fn test_health_reports_ok() {
        let app = build_router(AppState::for_tests(Arc::new(ScriptedModel::replying(""))));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "fitcheck-api");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = build_router(AppState::for_tests(Arc::new(ScriptedModel::replying(""))));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/analyse")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let mut state = AppState::for_tests(Arc::new(ScriptedModel::replying("")));
        state.config.max_upload_bytes = 16;
        let app = build_router(state);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/text/to/docx")
                    .header("content-type", "application/json")
                    .body(Body::from(format!("{{\"text\": \"{}\"}}", "x".repeat(64))))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
