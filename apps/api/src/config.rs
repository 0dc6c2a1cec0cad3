use std::str::FromStr;

use anyhow::{Context, Result};

use crate::extraction::ocr::OcrPageFailurePolicy;

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration loaded from environment variables.
/// Built once at startup and handed to the components that need it.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub gemini_timeout_secs: u64,
    pub gemini_max_retries: u32,
    pub tesseract_path: String,
    pub pdftoppm_path: String,
    pub ocr_language: String,
    pub ocr_dpi: u32,
    pub ocr_timeout_secs: u64,
    pub ocr_page_failure_policy: OcrPageFailurePolicy,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            // Not required at startup: a missing key shows up as an upstream
            // authentication failure on the first /analyze call.
            gemini_api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            gemini_api_base: env_or("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
            gemini_timeout_secs: parse_env("GEMINI_TIMEOUT_SECS", 120)?,
            gemini_max_retries: parse_env("GEMINI_MAX_RETRIES", 0)?,
            tesseract_path: env_or("TESSERACT_PATH", "tesseract"),
            pdftoppm_path: env_or("PDFTOPPM_PATH", "pdftoppm"),
            ocr_language: env_or("OCR_LANGUAGE", "eng"),
            ocr_dpi: parse_env("OCR_DPI", 300)?,
            ocr_timeout_secs: parse_env("OCR_TIMEOUT_SECS", 120)?,
            ocr_page_failure_policy: parse_env(
                "OCR_PAGE_FAILURE_POLICY",
                OcrPageFailurePolicy::Abort,
            )?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
            port: parse_env("PORT", 5000)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Defaults suitable for unit tests; never reads the environment.
    pub fn for_tests() -> Self {
        Config {
            gemini_api_key: "test-key".to_string(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            gemini_timeout_secs: 5,
            gemini_max_retries: 0,
            tesseract_path: "tesseract".to_string(),
            pdftoppm_path: "pdftoppm".to_string(),
            ocr_language: "eng".to_string(),
            ocr_dpi: 300,
            ocr_timeout_secs: 5,
            ocr_page_failure_policy: OcrPageFailurePolicy::Abort,
            max_upload_bytes: 1024 * 1024,
            port: 5000,
            rust_log: "info".to_string(),
        }
    }
}
