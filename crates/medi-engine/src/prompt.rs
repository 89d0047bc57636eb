//! Prompt templates, one per query type.
//!
//! Earlier turns travel separately as conversation context, so templates only
//! carry the current question and the session's disease focus.

use medi_core::enums::QueryType;

/// Appended to every prompt so the answer ends with a parseable score.
pub const CONFIDENCE_INSTRUCTION: &str = "Finish with a final line of the form \
     `Confidence: <number between 0 and 1>` rating how well the available evidence \
     supports your answer.";

#[must_use]
pub fn build_prompt(query_type: QueryType, query: &str, disease_focus: Option<&str>) -> String {
    let body = match query_type {
        QueryType::LiteratureSearch => format!(
            "Literature Search Request: {query}\n\n\
             Summarize the published evidence. Include:\n\
             1. Key findings from the most relevant studies\n\
             2. Treatment focus and the interventions studied\n\
             3. Study populations and their relevance\n\
             4. Clinical significance of the results"
        ),
        QueryType::TreatmentComparison => format!(
            "Treatment Comparison Request: {query}\n\n\
             Compare the treatments in a structured way. Include:\n\
             1. Efficacy comparison\n\
             2. Side effect profiles\n\
             3. Population-specific considerations\n\
             4. Clinical recommendations\n\
             5. Confidence level of the evidence"
        ),
        QueryType::ClinicalQuestion => format!(
            "Clinical Question: {query}\n\n\
             Please provide a comprehensive clinical response that includes:\n\
             1. Evidence-based answer\n\
             2. Clinical considerations\n\
             3. Relevant guidelines or recommendations\n\
             4. Any important warnings or contraindications"
        ),
        QueryType::GeneralMedical => format!(
            "Medical Query: {query}\n\n\
             Provide evidence-based medical information. Do not give specific medical \
             advice; recommend consulting healthcare providers and include appropriate \
             disclaimers."
        ),
    };

    let focus = disease_focus
        .filter(|f| !f.trim().is_empty())
        .map(|f| format!("Research focus: {f}\n\n"))
        .unwrap_or_default();

    format!("{focus}{body}\n\n{CONFIDENCE_INSTRUCTION}")
}
