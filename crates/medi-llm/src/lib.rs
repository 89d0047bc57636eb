//! # medi-llm
//!
//! The LLM boundary of the MediSyn query handler.
//!
//! - [`LlmClient`]: the trait the handler calls.
//! - [`GeminiClient`]: Google Gemini `generateContent` over `reqwest`.
//! - [`MockClient`]: deterministic canned answers for offline use.
//! - [`with_retry`]: exponential backoff around any call.
//! - [`parse_confidence`]: fallible extraction of a self-reported score.

pub mod client;
pub mod confidence;
mod error;
pub mod gemini;
mod http;
pub mod mock;
pub mod retry;

pub use client::{ContextTurn, LlmClient, LlmRequest, LlmResponse};
pub use confidence::{parse_confidence, split_confidence};
pub use error::LlmError;
pub use gemini::GeminiClient;
pub use mock::MockClient;
pub use retry::{RetryPolicy, with_retry};
