//! Human-in-the-loop approval gate.
//!
//! `ApprovalGate::evaluate` is a pure function of the response confidence,
//! its text, the query priority and configuration. Sensitivity detection is
//! pluggable through [`SensitivityPolicy`]; the keyword list shipped here is a
//! heuristic, not an exhaustive safety check.

use medi_config::ApprovalConfig;
use medi_core::entities::ResponseRecord;
use medi_core::enums::{Priority, QueryType, ReviewPriority, ReviewReason};
use serde::Serialize;

/// Terms whose presence sends a response to review.
pub const DEFAULT_SENSITIVE_KEYWORDS: &[&str] = &[
    "contraindicated",
    "black box warning",
    "fatal",
    "mortality",
    "severe adverse",
    "emergency",
    "toxic",
    "overdose",
];

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

/// Decides whether a response needs review on content grounds.
pub trait SensitivityPolicy: Send + Sync {
    /// Terms or rules that matched, empty when the text is not sensitive.
    fn matches(&self, text: &str) -> Vec<String>;

    fn is_sensitive(&self, text: &str) -> bool {
        !self.matches(text).is_empty()
    }
}

/// Case-insensitive substring match against a keyword list.
#[derive(Debug, Clone)]
pub struct KeywordSensitivityPolicy {
    keywords: Vec<String>,
}

impl KeywordSensitivityPolicy {
    /// Built-in keywords plus `extra`.
    #[must_use]
    pub fn new(extra: &[String]) -> Self {
        let mut keywords: Vec<String> = DEFAULT_SENSITIVE_KEYWORDS
            .iter()
            .map(|k| (*k).to_string())
            .collect();
        for kw in extra {
            let kw = kw.trim().to_lowercase();
            if !kw.is_empty() && !keywords.contains(&kw) {
                keywords.push(kw);
            }
        }
        Self { keywords }
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for KeywordSensitivityPolicy {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl SensitivityPolicy for KeywordSensitivityPolicy {
    fn matches(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        self.keywords
            .iter()
            .filter(|kw| lower.contains(kw.as_str()))
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    AutoApproved,
    Pending {
        reasons: Vec<ReviewReason>,
        review_priority: ReviewPriority,
    },
}

impl GateDecision {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

pub struct ApprovalGate {
    confidence_threshold: f64,
    critical_requires_review: bool,
    policy: Box<dyn SensitivityPolicy>,
}

impl std::fmt::Debug for ApprovalGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalGate")
            .field("confidence_threshold", &self.confidence_threshold)
            .field("critical_requires_review", &self.critical_requires_review)
            .finish_non_exhaustive()
    }
}

impl ApprovalGate {
    /// Gate with the keyword policy extended by the configured extras.
    #[must_use]
    pub fn from_config(config: &ApprovalConfig) -> Self {
        Self::with_policy(
            config,
            Box::new(KeywordSensitivityPolicy::new(&config.extra_sensitive_keywords)),
        )
    }

    #[must_use]
    pub fn with_policy(config: &ApprovalConfig, policy: Box<dyn SensitivityPolicy>) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
            critical_requires_review: config.critical_requires_review,
            policy,
        }
    }

    #[must_use]
    pub const fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    /// Decide whether a response can skip human review.
    #[must_use]
    pub fn evaluate(&self, response: &ResponseRecord, priority: Priority) -> GateDecision {
        let mut reasons = Vec::new();
        if response.confidence < self.confidence_threshold {
            reasons.push(ReviewReason::LowConfidence);
        }
        let matched = self.policy.matches(&response.text);
        if !matched.is_empty() {
            reasons.push(ReviewReason::SensitiveContent);
        }
        if priority == Priority::Critical && self.critical_requires_review {
            reasons.push(ReviewReason::CriticalPriority);
        }

        if reasons.is_empty() {
            return GateDecision::AutoApproved;
        }
        tracing::debug!(
            query_id = %response.query_id,
            confidence = response.confidence,
            ?reasons,
            ?matched,
            "response needs review"
        );
        GateDecision::Pending {
            reasons,
            review_priority: review_priority(priority, response.confidence),
        }
    }
}

/// How urgently a reviewer should look at a response.
#[must_use]
pub fn review_priority(priority: Priority, confidence: f64) -> ReviewPriority {
    if priority == Priority::Critical {
        ReviewPriority::Urgent
    } else if confidence > 0.9 {
        ReviewPriority::Low
    } else if confidence > 0.7 {
        ReviewPriority::Medium
    } else {
        ReviewPriority::High
    }
}

/// Reviewer checklist for a query type.
#[must_use]
pub const fn review_criteria(query_type: QueryType) -> &'static [&'static str] {
    match query_type {
        QueryType::LiteratureSearch => &[
            "Verify accuracy of key findings",
            "Check for potential bias in interpretation",
            "Validate treatment focus alignment",
            "Confirm population relevance",
            "Review confidence score justification",
        ],
        QueryType::TreatmentComparison => &[
            "Verify treatment efficacy claims",
            "Check for contraindications and warnings",
            "Validate population-specific considerations",
            "Review recommendation appropriateness",
            "Confirm source reliability",
        ],
        QueryType::ClinicalQuestion => &[
            "Verify medical accuracy",
            "Check for appropriate disclaimers",
            "Validate evidence-based content",
            "Review recommendation safety",
        ],
        QueryType::GeneralMedical => &["General medical accuracy check"],
    }
}

/// Rough reviewer effort, in minutes.
#[must_use]
pub const fn estimated_review_minutes(query_type: QueryType) -> u32 {
    match query_type {
        QueryType::LiteratureSearch => 10,
        QueryType::TreatmentComparison => 15,
        QueryType::ClinicalQuestion => 5,
        QueryType::GeneralMedical => 3,
    }
}
