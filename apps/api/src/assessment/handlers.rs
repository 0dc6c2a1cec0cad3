//! Axum route handler for the Assessment API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::assessment::assess;
use crate::assessment::models::{AssessmentRequest, AssessmentResult};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /analyze
///
/// Compares resume text with a job description and returns the model's
/// decision, score, and (when warranted) a cover letter. A field that is
/// absent, empty, or whitespace-only counts as missing and is rejected with
/// 400 before the model is called.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AssessmentRequest>, JsonRejection>,
) -> Result<Json<AssessmentResult>, AppError> {
    let Json(request) = payload?;
    let result = assess(state.llm.as_ref(), &request).await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::assessment::test_support::ScriptedModel;
    use crate::routes::build_router;
    use crate::state::AppState;

    fn post_json(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_missing_field_returns_400_without_upstream_call() {
        for missing in ["jobTitle", "jobDescription", "extractedText"] {
            let model = Arc::new(ScriptedModel::replying("{}"));
            let app = build_router(AppState::for_tests(model.clone()));

            let mut body = json!({
                "jobTitle": "Engineer",
                "jobDescription": "Build APIs",
                "extractedText": "Built APIs",
            });
            body.as_object_mut().unwrap().remove(missing);

            let response = app.oneshot(post_json(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{missing}");
            let body = body_json(response).await;
            assert_eq!(body["error"]["code"], "MISSING_FIELDS");
            assert_eq!(model.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_analyze_empty_field_returns_400() {
        for title in ["", "   \n\t"] {
            let model = Arc::new(ScriptedModel::replying("{}"));
            let app = build_router(AppState::for_tests(model.clone()));
            let response = app
                .oneshot(post_json(json!({
                    "jobTitle": title,
                    "jobDescription": "Build APIs",
                    "extractedText": "Built APIs",
                })))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{title:?}");
            assert_eq!(model.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_analyze_returns_parsed_result() {
        let reply = "```json\n{\"decision\":\"No\",\"reason\":\"You lack Go experience.\",\"score\":30,\"coverLetter\":\"\",\"resumeEnhancements\":\"\",\"jobSummary\":\"Go backend role\"}\n```";
        let model = Arc::new(ScriptedModel::replying(reply));
        let app = build_router(AppState::for_tests(model.clone()));
        let response = app
            .oneshot(post_json(json!({
                "jobTitle": "Go Engineer",
                "jobDescription": "Go, gRPC",
                "extractedText": "Python developer",
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["decision"], "No");
        assert_eq!(body["score"], 30);
        assert_eq!(body["jobSummary"], "Go backend role");
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_analyze_malformed_upstream_json_returns_500_with_raw() {
        let model = Arc::new(ScriptedModel::replying("{\"decision\": \"Yes\", oops"));
        let app = build_router(AppState::for_tests(model));
        let response = app
            .oneshot(post_json(json!({
                "jobTitle": "Engineer",
                "jobDescription": "Build APIs",
                "extractedText": "Built APIs",
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["raw"], "{\"decision\": \"Yes\", oops");
    }

    #[tokio::test]
    async fn test_analyze_malformed_request_body_returns_400() {
        let model = Arc::new(ScriptedModel::replying("{}"));
        let app = build_router(AppState::for_tests(model.clone()));
        let request = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(model.call_count(), 0);
    }
}
