//! The LLM boundary used by the query handler.

use async_trait::async_trait;
use medi_core::enums::QueryType;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// One earlier question/answer pair handed to the model as context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextTurn {
    pub query: String,
    pub response: String,
}

/// A single completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    pub query_type: QueryType,
    /// The researcher's question as it left the message filter.
    pub query: String,
    /// Fully rendered prompt text.
    pub prompt: String,
    /// Recent conversation, oldest first.
    pub context: Vec<ContextTurn>,
}

/// Model output with its self-reported confidence, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub confidence: Option<f64>,
}

/// Something that turns a prompt into an answer.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Run one completion.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] on transport, status, or parse failures.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;
}
