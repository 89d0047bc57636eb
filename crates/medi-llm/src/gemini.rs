//! Google Gemini `generateContent` client.
//!
//! Context turns become alternating `user` / `model` contents, followed by
//! the rendered prompt as the final `user` turn. The API key travels in the
//! `x-goog-api-key` header, never in the URL.

use std::time::Duration;

use async_trait::async_trait;
use medi_config::LlmConfig;
use serde_json::Value;

use crate::client::{LlmClient, LlmRequest, LlmResponse};
use crate::confidence::split_confidence;
use crate::error::LlmError;
use crate::http::check_response;

const PROVIDER: &str = "gemini";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for the Gemini REST API.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Build a client from the `llm` config section.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::NotConfigured`] without an API key, or
    /// [`LlmError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        if !config.is_configured() {
            return Err(LlmError::NotConfigured(
                "llm.api_key is empty (set GOOGLE_API_KEY or MEDISYN_LLM__API_KEY)".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .user_agent("medisyn/0.1")
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn endpoint_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request_body(&self, request: &LlmRequest) -> Value {
        let mut contents = Vec::with_capacity(request.context.len() * 2 + 1);
        for turn in &request.context {
            contents.push(serde_json::json!({
                "role": "user",
                "parts": [{"text": turn.query}],
            }));
            contents.push(serde_json::json!({
                "role": "model",
                "parts": [{"text": turn.response}],
            }));
        }
        contents.push(serde_json::json!({
            "role": "user",
            "parts": [{"text": request.prompt}],
        }));

        serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_output_tokens,
            },
        })
    }

    /// Concatenate the text parts of the first candidate.
    fn parse_response(body: &Value) -> Result<String, LlmError> {
        let candidate = body["candidates"]
            .as_array()
            .and_then(|c| c.first())
            .ok_or_else(|| LlmError::Parse("missing or empty 'candidates' array".to_string()))?;

        let parts = candidate["content"]["parts"]
            .as_array()
            .ok_or_else(|| {
                let reason = candidate["finishReason"].as_str().unwrap_or("unknown");
                LlmError::Parse(format!("candidate has no content parts (finishReason {reason})"))
            })?;

        let text: String = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(LlmError::Parse("candidate text is empty".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = self.build_request_body(request);
        tracing::debug!(
            model = %self.model,
            query_type = %request.query_type,
            context_turns = request.context.len(),
            "sending Gemini request"
        );

        let resp = self
            .http
            .post(self.endpoint_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = check_response(resp, PROVIDER).await?;
        let json: Value = resp.json().await?;

        let raw = Self::parse_response(&json)?;
        let (text, confidence) = split_confidence(&raw);
        Ok(LlmResponse { text, confidence })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ContextTurn;
    use medi_core::enums::QueryType;
    use pretty_assertions::assert_eq;

    fn configured() -> LlmConfig {
        LlmConfig {
            api_key: "test-key".to_string(),
            mock: false,
            ..LlmConfig::default()
        }
    }

    #[test]
    fn new_requires_api_key() {
        let err = GeminiClient::new(&LlmConfig::default()).unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured(_)));
    }

    #[test]
    fn endpoint_names_model_without_key() {
        let mut config = configured();
        config.base_url = "http://localhost:8080/v1beta/".to_string();
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint_url(),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn debug_output_hides_key() {
        let client = GeminiClient::new(&configured()).unwrap();
        assert!(!format!("{client:?}").contains("test-key"));
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_key() {
        let config = LlmConfig {
            api_key: "SECRET-KEY-123".to_string(),
            base_url: "http://127.0.0.1:1/v1beta".to_string(),
            mock: false,
            ..LlmConfig::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        let request = LlmRequest {
            query_type: QueryType::GeneralMedical,
            query: "q".into(),
            prompt: "p".into(),
            context: Vec::new(),
        };

        let err = client.complete(&request).await.unwrap_err();
        assert!(matches!(err, LlmError::Http(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"), "{err}");
        assert!(!format!("{err:?}").contains("SECRET-KEY-123"));
    }

    #[test]
    fn request_body_interleaves_context() {
        let client = GeminiClient::new(&configured()).unwrap();
        let request = LlmRequest {
            query_type: QueryType::ClinicalQuestion,
            query: "dose adjustment?".into(),
            prompt: "PROMPT".into(),
            context: vec![ContextTurn {
                query: "earlier q".into(),
                response: "earlier a".into(),
            }],
        };
        let body = client.build_request_body(&request);
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["text"], "earlier a");
        assert_eq!(contents[2]["parts"][0]["text"], "PROMPT");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn parse_joins_text_parts() {
        let body = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "Metformin remains first-line. "},
                    {"text": "Confidence: 0.9"}
                ]},
                "finishReason": "STOP"
            }]
        });
        let text = GeminiClient::parse_response(&body).unwrap();
        assert_eq!(text, "Metformin remains first-line. Confidence: 0.9");
    }

    #[test]
    fn parse_rejects_blocked_candidate() {
        let body = serde_json::json!({
            "candidates": [{"finishReason": "SAFETY"}]
        });
        let err = GeminiClient::parse_response(&body).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn parse_rejects_missing_candidates() {
        let body = serde_json::json!({"promptFeedback": {"blockReason": "OTHER"}});
        assert!(matches!(
            GeminiClient::parse_response(&body),
            Err(LlmError::Parse(_))
        ));
    }
}
