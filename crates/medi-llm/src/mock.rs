//! Deterministic offline client.
//!
//! Produces a templated answer per query type with a fixed synthetic
//! confidence. The same request always yields the same response, which keeps
//! mock-mode sessions and their reports reproducible.

use async_trait::async_trait;
use medi_core::enums::QueryType;

use crate::client::{LlmClient, LlmRequest, LlmResponse};
use crate::error::LlmError;

/// Offline stand-in for Gemini.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockClient;

impl MockClient {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// The canned answer for a query, without going through the trait.
    #[must_use]
    pub fn respond(query_type: QueryType, query: &str) -> LlmResponse {
        LlmResponse {
            text: render(query_type, query),
            confidence: Some(query_type.baseline_confidence()),
        }
    }
}

#[async_trait]
impl LlmClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        Ok(Self::respond(request.query_type, &request.query))
    }
}

fn render(query_type: QueryType, query: &str) -> String {
    match query_type {
        QueryType::LiteratureSearch => format!(
            "## Literature Summary\n\n\
             Query: {query}\n\n\
             1. Systematic reviews and meta-analyses published in the last five years \
             report consistent findings for the population described.\n\
             2. Randomized controlled trials form the bulk of the evidence; \
             observational cohorts support the main conclusions.\n\
             3. Heterogeneity between studies is moderate, mostly from differences \
             in follow-up duration.\n\n\
             Evidence level: moderate to high. Verify against primary sources before citing."
        ),
        QueryType::TreatmentComparison => format!(
            "## Treatment Comparison\n\n\
             Query: {query}\n\n\
             | Aspect | Option A | Option B |\n\
             |--------|----------|----------|\n\
             | Efficacy | Established in phase III trials | Comparable in head-to-head studies |\n\
             | Safety | Well characterised | Fewer long-term data |\n\
             | Cost | Generic available | Higher |\n\n\
             Choice depends on comorbidities and patient preference."
        ),
        QueryType::ClinicalQuestion => format!(
            "## Clinical Answer\n\n\
             Query: {query}\n\n\
             Current guidelines recommend individualised management. Consider baseline \
             risk, renal and hepatic function, and drug interactions before adjusting \
             therapy. Monitor response at regular intervals and document outcomes."
        ),
        QueryType::GeneralMedical => format!(
            "## Overview\n\n\
             Query: {query}\n\n\
             This topic is covered by current clinical reviews. Key points include the \
             underlying mechanism, the main diagnostic criteria, and the standard \
             treatment pathway. Consult specialty guidance for specific cases."
        ),
    }
}
