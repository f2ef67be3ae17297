// Summarizer module
use serde::Serialize;
use tracing::{info, warn};

use super::{LlmProvider, LlmRequest};

/// Trimmed input shorter than this is not worth a model call.
pub const MIN_SUMMARY_CHARS: usize = 200;

pub const TOO_SHORT_MESSAGE: &str = "Article content is too short or unavailable to summarize.";

const INSTRUCTION: &str =
    "Please provide a high-quality, neutral, five-sentence summary of the following news article:";

/// What came back from a summarize attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum SummaryOutcome {
    /// Model output, verbatim
    Generated(String),
    /// Input below [`MIN_SUMMARY_CHARS`]; no call was made
    TooShort,
    /// The provider call failed
    Failed(String),
}

impl SummaryOutcome {
    /// The single string shown to the reader, whatever the outcome.
    pub fn display_text(&self) -> String {
        match self {
            SummaryOutcome::Generated(text) => text.clone(),
            SummaryOutcome::TooShort => TOO_SHORT_MESSAGE.to_string(),
            SummaryOutcome::Failed(reason) => format!("Error generating summary: {}", reason),
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, SummaryOutcome::Generated(_))
    }
}

fn build_prompt(content: &str) -> String {
    format!("{}\n\n---\n\n{}", INSTRUCTION, content)
}

/// Ask `provider` for a five-sentence summary of `content`.
///
/// Absent or short content (under [`MIN_SUMMARY_CHARS`] once trimmed) returns
/// [`SummaryOutcome::TooShort`] without touching the provider. Provider errors
/// come back as [`SummaryOutcome::Failed`], never as `Err`.
pub async fn summarize_article<P: LlmProvider + ?Sized>(
    provider: &P,
    content: Option<&str>,
) -> SummaryOutcome {
    let content = match content {
        Some(text) if text.trim().chars().count() >= MIN_SUMMARY_CHARS => text,
        _ => return SummaryOutcome::TooShort,
    };

    match provider.generate(LlmRequest::new(build_prompt(content))).await {
        Ok(response) => {
            info!(
                "LLM summarization successful: model {}, {} tokens",
                response.model, response.usage.total_tokens
            );
            SummaryOutcome::Generated(response.content)
        }
        Err(e) => {
            warn!("LLM summarization failed: {:#}", e);
            SummaryOutcome::Failed(format!("{:#}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmResponse, UsageMetadata};
    use anyhow::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct CountingProvider {
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
        fail: bool,
    }

    impl CountingProvider {
        fn new(fail: bool) -> Self {
            Self { calls: AtomicUsize::new(0), last_prompt: Mutex::new(None), fail }
        }
    }

    #[async_trait::async_trait]
    impl LlmProvider for CountingProvider {
        async fn generate(&self, request: LlmRequest) -> Result<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(request.prompt);
            if self.fail {
                anyhow::bail!("LLM API error 429: quota exceeded");
            }
            Ok(LlmResponse {
                content: "Five sentences.".to_string(),
                usage: UsageMetadata::default(),
                model: "stub".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn short_or_absent_content_skips_the_provider() {
        let provider = CountingProvider::new(false);
        let padded = format!("   {}   ", "x".repeat(MIN_SUMMARY_CHARS - 1));

        for input in [None, Some(""), Some("   "), Some("A short teaser."), Some(padded.as_str())] {
            assert_eq!(summarize_article(&provider, input).await, SummaryOutcome::TooShort);
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn long_content_is_sent_with_instruction() {
        let provider = CountingProvider::new(false);
        let body = "word ".repeat(60);

        let outcome = summarize_article(&provider, Some(&body)).await;

        assert_eq!(outcome, SummaryOutcome::Generated("Five sentences.".to_string()));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        let prompt = provider.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.starts_with(INSTRUCTION));
        assert!(prompt.ends_with(&body));
    }

    #[tokio::test]
    async fn provider_errors_become_failed_outcomes() {
        let provider = CountingProvider::new(true);
        let outcome = summarize_article(&provider, Some(&"y".repeat(300))).await;

        match &outcome {
            SummaryOutcome::Failed(reason) => assert!(reason.contains("429")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(outcome.display_text().starts_with("Error generating summary"));
        assert!(!outcome.is_generated());
    }

    #[test]
    fn display_collapses_outcomes() {
        assert_eq!(SummaryOutcome::TooShort.display_text(), TOO_SHORT_MESSAGE);
        assert_eq!(SummaryOutcome::Generated("ok".into()).display_text(), "ok");
    }

    #[test]
    fn json_keeps_the_tag() {
        let json = serde_json::to_value(SummaryOutcome::Failed("boom".into())).unwrap();
        assert_eq!(json["kind"], "failed");
        assert_eq!(json["text"], "boom");
        let json = serde_json::to_value(SummaryOutcome::TooShort).unwrap();
        assert_eq!(json["kind"], "too_short");
    }
}
