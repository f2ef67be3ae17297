use anyhow::Result;
use common::LlmConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Core trait for summarization backends
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate completion for a given prompt
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse>;
}

/// Request structure for LLM generation
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub prompt: String,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
}

impl LlmRequest {
    /// A request that uses the provider defaults for everything but the prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
            timeout_seconds: None,
        }
    }
}

/// Response from LLM generation
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub usage: UsageMetadata,
    pub model: String,
}

/// Token usage metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

pub mod gemini;
pub mod summarizer;

/// Build the Gemini provider described by `[llm]`.
pub fn create_llm_provider(config: &LlmConfig, api_key: &str) -> Arc<dyn LlmProvider> {
    let base_url = config.api_url.as_deref().unwrap_or(gemini::DEFAULT_BASE_URL);
    Arc::new(
        gemini::GeminiProvider::new(base_url, api_key, &config.model).with_defaults(
            config.timeout_seconds,
            config.max_tokens,
            config.temperature,
        ),
    )
}
