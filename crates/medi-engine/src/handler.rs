//! Medical query handler.
//!
//! Renders the prompt, calls the configured client under the retry policy,
//! and settles the confidence score. In mock mode the client is the offline
//! `MockClient`; in live mode it is Gemini, optionally falling back to the
//! mock answer once retries are exhausted.

use std::sync::Arc;

use medi_config::LlmConfig;
use medi_core::entities::MemoryEntry;
use medi_core::enums::{QueryType, ResponseSource};
use medi_llm::{
    ContextTurn, GeminiClient, LlmClient, LlmError, LlmRequest, MockClient, RetryPolicy,
    with_retry,
};
use serde::Serialize;

use crate::prompt::build_prompt;

/// What the handler produced for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandledResponse {
    pub text: String,
    pub confidence: f64,
    pub source: ResponseSource,
}

pub struct QueryHandler {
    client: Arc<dyn LlmClient>,
    source: ResponseSource,
    retry: RetryPolicy,
    fallback_to_mock: bool,
}

impl std::fmt::Debug for QueryHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryHandler")
            .field("client", &self.client.name())
            .field("source", &self.source)
            .field("retry", &self.retry)
            .field("fallback_to_mock", &self.fallback_to_mock)
            .finish()
    }
}

impl QueryHandler {
    /// Build the handler the configuration asks for.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::NotConfigured` in live mode without an API key, or
    /// `LlmError::Http` if the HTTP client cannot be built.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        if config.mock {
            return Ok(Self::mock());
        }
        let client = GeminiClient::new(config)?;
        Ok(Self {
            client: Arc::new(client),
            source: ResponseSource::Live,
            retry: RetryPolicy::from_config(config),
            fallback_to_mock: config.fallback_to_mock,
        })
    }

    /// Offline handler. Never fails.
    #[must_use]
    pub fn mock() -> Self {
        Self {
            client: Arc::new(MockClient::new()),
            source: ResponseSource::Mock,
            retry: RetryPolicy::none(),
            fallback_to_mock: false,
        }
    }

    /// Handler around an arbitrary client whose answers count as live.
    #[must_use]
    pub fn with_client(
        client: Arc<dyn LlmClient>,
        retry: RetryPolicy,
        fallback_to_mock: bool,
    ) -> Self {
        Self {
            client,
            source: ResponseSource::Live,
            retry,
            fallback_to_mock,
        }
    }

    #[must_use]
    pub const fn source(&self) -> ResponseSource {
        self.source
    }

    /// Answer a query given recent session context.
    ///
    /// A missing confidence line falls back to the query type's baseline.
    ///
    /// # Errors
    ///
    /// Returns the final `LlmError` once retries are exhausted and fallback
    /// is disabled.
    pub async fn process(
        &self,
        query_text: &str,
        query_type: QueryType,
        disease_focus: Option<&str>,
        context: &[MemoryEntry],
    ) -> Result<HandledResponse, LlmError> {
        let request = LlmRequest {
            query_type,
            query: query_text.to_string(),
            prompt: build_prompt(query_type, query_text, disease_focus),
            context: context
                .iter()
                .map(|entry| ContextTurn {
                    query: entry.query_text.clone(),
                    response: entry.response_text.clone(),
                })
                .collect(),
        };

        let client = self.client.as_ref();
        let request = &request;
        let result = with_retry(&self.retry, || async move { client.complete(request).await }).await;

        match result {
            Ok(answer) => {
                let confidence = answer
                    .confidence
                    .unwrap_or_else(|| query_type.baseline_confidence())
                    .clamp(0.0, 1.0);
                tracing::debug!(
                    client = self.client.name(),
                    %query_type,
                    confidence,
                    parsed = answer.confidence.is_some(),
                    "query answered"
                );
                Ok(HandledResponse {
                    text: answer.text,
                    confidence,
                    source: self.source,
                })
            }
            Err(err) if self.fallback_to_mock => {
                tracing::warn!(
                    client = self.client.name(),
                    error = %err,
                    "retries exhausted, answering from mock"
                );
                let answer = MockClient::respond(query_type, query_text);
                Ok(HandledResponse {
                    text: answer.text,
                    confidence: answer
                        .confidence
                        .unwrap_or_else(|| query_type.baseline_confidence()),
                    source: ResponseSource::Mock,
                })
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use medi_llm::LlmResponse;
    use pretty_assertions::assert_eq;

    struct Flaky {
        failures: u32,
        calls: AtomicU32,
        seen: Mutex<Vec<LlmRequest>>,
    }

    impl Flaky {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(LlmError::Api {
                    status: 503,
                    message: "unavailable".into(),
                });
            }
            Ok(LlmResponse {
                text: "Use metformin first.".into(),
                confidence: None,
            })
        }
    }

    fn quick_retry(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_backoff: std::time::Duration::ZERO,
            max_backoff: std::time::Duration::ZERO,
        }
    }

    fn entry(query: &str, response: &str) -> MemoryEntry {
        MemoryEntry {
            id: "mem-1".into(),
            session_id: "ses-1".into(),
            query_id: "qry-1".into(),
            query_text: query.into(),
            query_type: QueryType::ClinicalQuestion,
            response_text: response.into(),
            confidence: 0.8,
            source: ResponseSource::Live,
            stored_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn mock_mode_uses_baselines() {
        let handler = QueryHandler::mock();
        for query_type in QueryType::ALL {
            let out = handler.process("asthma inhalers", query_type, None, &[]).await.unwrap();
            assert_eq!(out.source, ResponseSource::Mock);
            assert!((out.confidence - query_type.baseline_confidence()).abs() < f64::EPSILON);
        }
    }

    #[tokio::test]
    async fn mock_mode_is_deterministic() {
        let handler = QueryHandler::mock();
        let a = handler.process("statins", QueryType::LiteratureSearch, None, &[]).await.unwrap();
        let b = handler.process("statins", QueryType::LiteratureSearch, None, &[]).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn retries_then_succeeds_with_baseline_confidence() {
        let client = Arc::new(Flaky::new(2));
        let handler = QueryHandler::with_client(client.clone(), quick_retry(3), false);
        let out = handler
            .process("metformin", QueryType::TreatmentComparison, None, &[])
            .await
            .unwrap();
        assert_eq!(client.calls.load(Ordering::SeqCst), 3);
        assert_eq!(out.source, ResponseSource::Live);
        assert!((out.confidence - 0.80).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn exhaustion_without_fallback_fails() {
        let client = Arc::new(Flaky::new(10));
        let handler = QueryHandler::with_client(client.clone(), quick_retry(2), false);
        let err = handler
            .process("metformin", QueryType::ClinicalQuestion, None, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 503, .. }));
        assert_eq!(client.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_with_fallback_answers_from_mock() {
        let handler = QueryHandler::with_client(Arc::new(Flaky::new(10)), quick_retry(1), true);
        let out = handler
            .process("metformin", QueryType::ClinicalQuestion, None, &[])
            .await
            .unwrap();
        assert_eq!(out.source, ResponseSource::Mock);
        assert!((out.confidence - 0.75).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn context_is_forwarded_in_order() {
        let client = Arc::new(Flaky::new(0));
        let handler = QueryHandler::with_client(client.clone(), quick_retry(0), false);
        let context = [entry("first", "one"), entry("second", "two")];
        handler
            .process("third", QueryType::ClinicalQuestion, Some("diabetes"), &context)
            .await
            .unwrap();

        let seen = client.seen.lock().unwrap();
        let turns: Vec<&str> = seen[0].context.iter().map(|t| t.query.as_str()).collect();
        assert_eq!(turns, vec!["first", "second"]);
        assert!(seen[0].prompt.contains("Research focus: diabetes"));
    }
}
