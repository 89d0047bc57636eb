//! Status enums, classifications, and actions for MediSyn.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Status enums with state machines provide `allowed_next_states()` to enforce
//! valid transitions at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// Status of a research session.
///
/// ```text
/// active → archived
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Archived,
}

impl SessionStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Active => &[Self::Archived],
            Self::Archived => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// QueryType
// ---------------------------------------------------------------------------

/// Kind of research question. Drives prompt selection and the baseline
/// confidence used when the model does not report one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    LiteratureSearch,
    TreatmentComparison,
    ClinicalQuestion,
    GeneralMedical,
}

impl QueryType {
    pub const ALL: [Self; 4] = [
        Self::LiteratureSearch,
        Self::TreatmentComparison,
        Self::ClinicalQuestion,
        Self::GeneralMedical,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LiteratureSearch => "literature_search",
            Self::TreatmentComparison => "treatment_comparison",
            Self::ClinicalQuestion => "clinical_question",
            Self::GeneralMedical => "general_medical",
        }
    }

    /// Confidence assigned to mock responses, and to live responses that
    /// carry no parseable score.
    #[must_use]
    pub const fn baseline_confidence(self) -> f64 {
        match self {
            Self::LiteratureSearch => 0.85,
            Self::TreatmentComparison => 0.80,
            Self::ClinicalQuestion => 0.75,
            Self::GeneralMedical => 0.70,
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Researcher-assigned urgency of a query.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ResponseSource
// ---------------------------------------------------------------------------

/// Where a response text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Live,
    Mock,
}

impl ResponseSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Mock => "mock",
        }
    }
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ApprovalStatus / ApprovalDecision
// ---------------------------------------------------------------------------

/// Status of a human review request.
///
/// ```text
/// pending → approved
///         → rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Approved, Self::Rejected],
            Self::Approved | Self::Rejected => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reviewer's verdict on a pending approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approved,
    Rejected,
}

impl ApprovalDecision {
    #[must_use]
    pub const fn status(self) -> ApprovalStatus {
        match self {
            Self::Approved => ApprovalStatus::Approved,
            Self::Rejected => ApprovalStatus::Rejected,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.status().as_str()
    }
}

impl fmt::Display for ApprovalDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ReviewReason / ReviewPriority
// ---------------------------------------------------------------------------

/// Why a response was routed to human review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReviewReason {
    LowConfidence,
    SensitiveContent,
    CriticalPriority,
}

impl ReviewReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LowConfidence => "low_confidence",
            Self::SensitiveContent => "sensitive_content",
            Self::CriticalPriority => "critical_priority",
        }
    }
}

impl fmt::Display for ReviewReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How soon a reviewer should look at a pending approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPriority {
    Urgent,
    High,
    Medium,
    Low,
}

impl ReviewPriority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for ReviewPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Message filter verdict on an incoming query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Informational,
    Noise,
    Empty,
}

impl Classification {
    /// Only informational input proceeds to the query handler.
    #[must_use]
    pub const fn is_informational(self) -> bool {
        matches!(self, Self::Informational)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Informational => "informational",
            Self::Noise => "noise",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// WorkflowStep
// ---------------------------------------------------------------------------

/// Step of a single query's trip through the assistant.
///
/// ```text
/// intake → filtered → queried → responded → approved → memory_written → done
///                 ↘ done                  ↘ approval_pending → approved
///                                                            → rejected → done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    Intake,
    Filtered,
    Queried,
    Responded,
    ApprovalPending,
    Approved,
    Rejected,
    MemoryWritten,
    Done,
}

impl WorkflowStep {
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Intake => &[Self::Filtered],
            Self::Filtered => &[Self::Queried, Self::Done],
            Self::Queried => &[Self::Responded],
            Self::Responded => &[Self::ApprovalPending, Self::Approved],
            Self::ApprovalPending => &[Self::Approved, Self::Rejected],
            Self::Approved => &[Self::MemoryWritten],
            Self::Rejected => &[Self::Done],
            Self::MemoryWritten => &[Self::Done],
            Self::Done => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Intake => "intake",
            Self::Filtered => "filtered",
            Self::Queried => "queried",
            Self::Responded => "responded",
            Self::ApprovalPending => "approval_pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::MemoryWritten => "memory_written",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ReportFormat
// ---------------------------------------------------------------------------

/// Output format of a session report.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Csv,
    Json,
}

impl ReportFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType / AuditAction
// ---------------------------------------------------------------------------

/// Entity kinds referenced by the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Session,
    Query,
    Response,
    Approval,
    Memory,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Query => "query",
            Self::Response => "response",
            Self::Approval => "approval",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutations recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    SessionStarted,
    SessionArchived,
    ApprovalRequested,
    Approved,
    Rejected,
    MemoryCleanup,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SessionStarted => "session_started",
            Self::SessionArchived => "session_archived",
            Self::ApprovalRequested => "approval_requested",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::MemoryCleanup => "memory_cleanup",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_can_only_be_archived_once() {
        assert!(SessionStatus::Active.can_transition_to(SessionStatus::Archived));
        assert!(!SessionStatus::Archived.can_transition_to(SessionStatus::Active));
    }

    #[test]
    fn approval_terminal_states_are_final() {
        assert!(ApprovalStatus::Pending.can_transition_to(ApprovalStatus::Approved));
        assert!(ApprovalStatus::Pending.can_transition_to(ApprovalStatus::Rejected));
        assert!(ApprovalStatus::Approved.allowed_next_states().is_empty());
        assert!(ApprovalStatus::Rejected.allowed_next_states().is_empty());
    }

    #[test]
    fn workflow_noise_path_skips_to_done() {
        assert!(WorkflowStep::Filtered.can_transition_to(WorkflowStep::Done));
        assert!(!WorkflowStep::Intake.can_transition_to(WorkflowStep::Queried));
    }

    #[test]
    fn workflow_rejected_never_writes_memory() {
        assert!(!WorkflowStep::Rejected.can_transition_to(WorkflowStep::MemoryWritten));
        assert!(WorkflowStep::Rejected.can_transition_to(WorkflowStep::Done));
    }

    #[test]
    fn only_done_is_terminal() {
        let steps = [
            WorkflowStep::Intake,
            WorkflowStep::Filtered,
            WorkflowStep::Queried,
            WorkflowStep::Responded,
            WorkflowStep::ApprovalPending,
            WorkflowStep::Approved,
            WorkflowStep::Rejected,
            WorkflowStep::MemoryWritten,
        ];
        for step in steps {
            assert!(!step.is_terminal(), "{step} should not be terminal");
            assert!(!step.allowed_next_states().is_empty());
        }
        assert!(WorkflowStep::Done.is_terminal());
    }

    #[test]
    fn as_str_matches_serde() {
        for qt in QueryType::ALL {
            let json = serde_json::to_value(qt).unwrap();
            assert_eq!(json, serde_json::Value::String(qt.as_str().to_string()));
        }
        let json = serde_json::to_value(WorkflowStep::ApprovalPending).unwrap();
        assert_eq!(json, "approval_pending");
    }

    #[test]
    fn decision_maps_to_status() {
        assert_eq!(ApprovalDecision::Approved.status(), ApprovalStatus::Approved);
        assert_eq!(ApprovalDecision::Rejected.as_str(), "rejected");
    }
}
