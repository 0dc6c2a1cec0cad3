use std::sync::Arc;

use crate::config::Config;
use crate::extraction::Extractor;
use crate::llm_client::GenerativeModel;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data; every request is handled independently.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// The generative model behind `/analyze`. Default: `GeminiClient`.
    pub llm: Arc<dyn GenerativeModel>,
    pub extractor: Arc<Extractor>,
}

impl AppState {
    pub fn new(config: Config, llm: Arc<dyn GenerativeModel>) -> Self {
        let extractor = Arc::new(Extractor::from_config(&config));
        Self {
            config,
            llm,
            extractor,
        }
    }
}

#[cfg(test)]
impl AppState {
    pub fn for_tests(llm: Arc<dyn GenerativeModel>) -> Self {
        Self::new(Config::for_tests(), llm)
    }
}
