//! Fit assessment: one prompt to the generative model, one typed result back.
//! All model calls go through `llm_client::GenerativeModel`.

pub mod handlers;
pub mod models;
pub mod prompts;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{strip_json_fences, GenerativeModel};
use models::{AssessmentRequest, AssessmentResult};
use prompts::build_assessment_prompt;

/// Validates the request, asks the model for an assessment and parses it.
///
/// Fails with `MissingFields` before any network call when an input is blank.
pub async fn assess(
    model: &dyn GenerativeModel,
    request: &AssessmentRequest,
) -> Result<AssessmentResult, AppError> {
    let missing = request.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::MissingFields(missing.join(", ")));
    }

    let prompt = build_assessment_prompt(
        request.job_title.as_deref().unwrap_or_default(),
        request.job_description.as_deref().unwrap_or_default(),
        request.extracted_text.as_deref().unwrap_or_default(),
    );

    let raw = model.generate(&prompt).await?;
    let result = parse_assessment(&raw)?;

    info!(
        decision = ?result.decision,
        score = result.score,
        has_cover_letter = !result.cover_letter.is_empty(),
        "Assessment complete"
    );

    Ok(result)
}

/// Parses model output into an `AssessmentResult`, stripping code fences first.
pub fn parse_assessment(raw: &str) -> Result<AssessmentResult, AppError> {
    let cleaned = strip_json_fences(raw);

    let invalid = |message: String| AppError::InvalidUpstreamJson {
        message,
        raw: cleaned.to_string(),
    };

    let mut result: AssessmentResult =
        serde_json::from_str(cleaned).map_err(|e| invalid(e.to_string()))?;

    if result.score > 100 {
        return Err(invalid(format!("score {} is outside 0-100", result.score)));
    }

    let cleared = result.enforce_invariants();
    if !cleared.is_empty() {
        warn!(
            decision = ?result.decision,
            score = result.score,
            "Model filled fields it should have left empty; cleared {}",
            cleared.join(", ")
        );
    }

    Ok(result)
}


#[cfg(test)]
mod tests {
    use super::test_support::ScriptedModel;
    use super::*;
    use crate::assessment::models::Decision;
    use crate::llm_client::LlmError;

    const RESULT_JSON: &str = r#"{
        "decision": "Yes",
        "reason": "You have shipped the exact stack this team uses.",
        "score": 82,
        "coverLetter": "Application for Backend Engineer\n\nDear team,",
        "resumeEnhancements": "Mention your Postgres tuning work.",
        "jobSummary": "Backend role focused on Rust services."
    }"#;

    fn full_request() -> AssessmentRequest {
        AssessmentRequest {
            job_title: Some("Backend Engineer".to_string()),
            job_description: Some("Rust, Postgres, Kubernetes".to_string()),
            extracted_text: Some("Five years of Rust".to_string()),
        }
    }

    #[test]
    fn test_fenced_and_plain_responses_parse_identically() {
        let plain = parse_assessment(RESULT_JSON).unwrap();
        let fenced = parse_assessment(&format!("```json\n{RESULT_JSON}\n```")).unwrap();
        let bare_fence = parse_assessment(&format!("```\n{RESULT_JSON}\n```")).unwrap();
        assert_eq!(plain, fenced);
        assert_eq!(plain, bare_fence);
        assert_eq!(plain.decision, Decision::Yes);
        assert_eq!(plain.score, 82);
    }

    #[test]
    fn test_malformed_json_keeps_raw_text() {
        let err = parse_assessment("I think you should apply!").unwrap_err();
        match err {
            AppError::InvalidUpstreamJson { raw, .. } => {
                assert_eq!(raw, "I think you should apply!")
            }
            other => panic!("expected InvalidUpstreamJson, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_score_is_rejected() {
        let raw = RESULT_JSON.replace("82", "140");
        assert!(matches!(
            parse_assessment(&raw),
            Err(AppError::InvalidUpstreamJson { .. })
        ));
    }

    #[test]
    fn test_negative_score_is_rejected() {
        let raw = RESULT_JSON.replace("82", "-5");
        assert!(matches!(
            parse_assessment(&raw),
            Err(AppError::InvalidUpstreamJson { .. })
        ));
    }

    #[test]
    fn test_cover_letter_cleared_below_threshold() {
        let raw = RESULT_JSON.replace("82", "45");
        let result = parse_assessment(&raw).unwrap();
        assert!(result.cover_letter.is_empty());
        assert!(!result.resume_enhancements.is_empty());
    }

    #[tokio::test]
    async fn test_assess_sends_prompt_with_inputs() {
        let model = ScriptedModel::replying(RESULT_JSON);
        let result = assess(&model, &full_request()).await.unwrap();
        assert_eq!(result.score, 82);
        assert_eq!(model.call_count(), 1);

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("Job Title:\nBackend Engineer"));
        assert!(prompts[0].contains("Resume:\nFive years of Rust"));
    }

    #[tokio::test]
    async fn test_assess_rejects_blank_fields_without_calling_model() {
        let model = ScriptedModel::replying(RESULT_JSON);
        let mut request = full_request();
        request.job_description = Some(String::new());

        let err = assess(&model, &request).await.unwrap_err();
        assert!(matches!(err, AppError::MissingFields(ref f) if f == "jobDescription"));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_assess_propagates_upstream_status() {
        let model = ScriptedModel::failing(LlmError::Api {
            status: 429,
            body: "{\"error\":\"quota\"}".to_string(),
        });
        let err = assess(&model, &full_request()).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_assess_maps_timeout() {
        let model = ScriptedModel::failing(LlmError::Timeout);
        let err = assess(&model, &full_request()).await.unwrap_err();
        assert!(matches!(err, AppError::Timeout));
    }
}
