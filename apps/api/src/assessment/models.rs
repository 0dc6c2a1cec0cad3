use serde::{Deserialize, Serialize};

/// Minimum score at which a `Yes` decision carries a cover letter.
pub const COVER_LETTER_MIN_SCORE: u8 = 60;

/// Body of `POST /analyze`. Fields are optional at the wire level so a
/// missing key is reported as `MISSING_FIELDS` rather than a parse failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRequest {
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub extracted_text: Option<String>,
}

impl AssessmentRequest {
    /// Wire names of the fields that are absent, empty, or whitespace-only.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("jobTitle", &self.job_title),
            ("jobDescription", &self.job_description),
            ("extractedText", &self.extracted_text),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Yes,
    No,
}

/// Structured fit assessment returned by the model.
///
/// Every field is required when deserializing; a response missing any of
/// them is treated as invalid upstream JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub decision: Decision,
    pub reason: String,
    pub score: u8,
    pub cover_letter: String,
    pub resume_enhancements: String,
    pub job_summary: String,
}

impl AssessmentResult {
    pub fn qualifies_for_cover_letter(&self) -> bool {
        self.decision == Decision::Yes && self.score >= COVER_LETTER_MIN_SCORE
    }

    /// Clears fields the model should have left empty. Returns the names of
    /// the fields that were cleared.
    pub fn enforce_invariants(&mut self) -> Vec<&'static str> {
        let mut cleared = Vec::new();
        if !self.qualifies_for_cover_letter() && !self.cover_letter.is_empty() {
            self.cover_letter.clear();
            cleared.push("coverLetter");
        }
        if self.decision == Decision::No && !self.resume_enhancements.is_empty() {
            self.resume_enhancements.clear();
            cleared.push("resumeEnhancements");
        }
        cleared
    }
}
