//! Per-query workflow state machine.
//!
//! Each step is an explicit method. A forbidden step returns
//! `CoreError::InvalidTransition` and leaves the state where it was.

use medi_core::entities::ApprovalRecord;
use medi_core::enums::{ApprovalStatus, WorkflowStep};
use medi_core::errors::CoreError;

use crate::approval::GateDecision;
use crate::filter::FilterVerdict;

#[derive(Debug, Clone)]
pub struct QueryWorkflow {
    query_id: Option<String>,
    state: WorkflowStep,
    /// `None` until the filter has run.
    passed_filter: Option<bool>,
    history: Vec<WorkflowStep>,
}

impl Default for QueryWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryWorkflow {
    #[must_use]
    pub fn new() -> Self {
        Self {
            query_id: None,
            state: WorkflowStep::Intake,
            passed_filter: None,
            history: vec![WorkflowStep::Intake],
        }
    }

    /// Pick a query back up at `ApprovalPending` from its approval record.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the record was already
    /// decided.
    pub fn resume_pending(approval: &ApprovalRecord) -> Result<Self, CoreError> {
        if approval.status != ApprovalStatus::Pending {
            return Err(CoreError::InvalidTransition {
                entity_type: "approval".into(),
                id: approval.id.clone(),
                from: approval.status.to_string(),
                to: "resolved".into(),
            });
        }
        Ok(Self {
            query_id: Some(approval.query_id.clone()),
            state: WorkflowStep::ApprovalPending,
            passed_filter: Some(true),
            history: vec![WorkflowStep::ApprovalPending],
        })
    }

    #[must_use]
    pub const fn state(&self) -> WorkflowStep {
        self.state
    }

    /// Every state visited so far, starting with the initial one.
    #[must_use]
    pub fn history(&self) -> &[WorkflowStep] {
        &self.history
    }

    #[must_use]
    pub fn query_id(&self) -> Option<&str> {
        self.query_id.as_deref()
    }

    pub fn set_query_id(&mut self, query_id: impl Into<String>) {
        self.query_id = Some(query_id.into());
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Record the filter verdict. `INTAKE → FILTERED`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` outside `INTAKE`.
    pub fn filter(&mut self, verdict: &FilterVerdict) -> Result<WorkflowStep, CoreError> {
        self.advance(WorkflowStep::Filtered)?;
        self.passed_filter = Some(verdict.is_informational());
        Ok(self.state)
    }

    /// `FILTERED → QUERIED`, only for input the filter accepted.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the filter rejected the
    /// input or the workflow is elsewhere.
    pub fn mark_queried(&mut self) -> Result<WorkflowStep, CoreError> {
        if self.state == WorkflowStep::Filtered && self.passed_filter != Some(true) {
            return Err(self.violation(WorkflowStep::Queried));
        }
        self.advance(WorkflowStep::Queried)
    }

    /// `QUERIED → RESPONDED`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` outside `QUERIED`.
    pub fn mark_responded(&mut self) -> Result<WorkflowStep, CoreError> {
        self.advance(WorkflowStep::Responded)
    }

    /// Route a response by the gate's decision.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` outside `RESPONDED`.
    pub fn route(&mut self, decision: &GateDecision) -> Result<WorkflowStep, CoreError> {
        let next = match decision {
            GateDecision::AutoApproved => WorkflowStep::Approved,
            GateDecision::Pending { .. } => WorkflowStep::ApprovalPending,
        };
        self.advance(next)
    }

    /// Reviewer approval. `APPROVAL_PENDING → APPROVED`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` outside `APPROVAL_PENDING`.
    pub fn approve(&mut self) -> Result<WorkflowStep, CoreError> {
        if self.state != WorkflowStep::ApprovalPending {
            return Err(self.violation(WorkflowStep::Approved));
        }
        self.advance(WorkflowStep::Approved)
    }

    /// Reviewer rejection. `APPROVAL_PENDING → REJECTED`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` outside `APPROVAL_PENDING`.
    pub fn reject(&mut self) -> Result<WorkflowStep, CoreError> {
        self.advance(WorkflowStep::Rejected)
    }

    /// `APPROVED → MEMORY_WRITTEN`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` outside `APPROVED`.
    pub fn mark_memory_written(&mut self) -> Result<WorkflowStep, CoreError> {
        self.advance(WorkflowStep::MemoryWritten)
    }

    /// Close the workflow from `FILTERED` (rejected input), `REJECTED` or
    /// `MEMORY_WRITTEN`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` from any other state, or from
    /// `FILTERED` when the filter accepted the input.
    pub fn finish(&mut self) -> Result<WorkflowStep, CoreError> {
        if self.state == WorkflowStep::Filtered && self.passed_filter == Some(true) {
            return Err(self.violation(WorkflowStep::Done));
        }
        self.advance(WorkflowStep::Done)
    }

    fn advance(&mut self, next: WorkflowStep) -> Result<WorkflowStep, CoreError> {
        if !self.state.can_transition_to(next) {
            return Err(self.violation(next));
        }
        tracing::trace!(
            query_id = self.query_id.as_deref().unwrap_or("-"),
            from = %self.state,
            to = %next,
            "workflow transition"
        );
        self.state = next;
        self.history.push(next);
        Ok(next)
    }

    fn violation(&self, to: WorkflowStep) -> CoreError {
        CoreError::InvalidTransition {
            entity_type: "workflow".into(),
            id: self.query_id.clone().unwrap_or_else(|| "-".into()),
            from: self.state.to_string(),
            to: to.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use medi_core::enums::{ReviewPriority, ReviewReason};
    use pretty_assertions::assert_eq;

    use crate::filter::MessageFilter;

    fn accepted() -> FilterVerdict {
        MessageFilter::new().classify("metformin dosing in chronic kidney disease")
    }

    fn rejected() -> FilterVerdict {
        MessageFilter::new().classify("")
    }

    fn pending_record(status: ApprovalStatus) -> ApprovalRecord {
        ApprovalRecord {
            id: "apr-00000001".into(),
            query_id: "qry-00000001".into(),
            status,
            reasons: vec![ReviewReason::LowConfidence],
            review_priority: ReviewPriority::High,
            reviewer: None,
            feedback: None,
            created_at: Utc::now(),
            decided_at: None,
        }
    }

    #[test]
    fn rejected_input_goes_straight_to_done() {
        let mut wf = QueryWorkflow::new();
        wf.filter(&rejected()).unwrap();
        assert!(wf.mark_queried().is_err());
        wf.finish().unwrap();
        assert_eq!(
            wf.history(),
            &[WorkflowStep::Intake, WorkflowStep::Filtered, WorkflowStep::Done]
        );
    }

    #[test]
    fn auto_approved_path() {
        let mut wf = QueryWorkflow::new();
        wf.filter(&accepted()).unwrap();
        wf.mark_queried().unwrap();
        wf.mark_responded().unwrap();
        assert_eq!(wf.route(&GateDecision::AutoApproved).unwrap(), WorkflowStep::Approved);
        wf.mark_memory_written().unwrap();
        assert_eq!(wf.finish().unwrap(), WorkflowStep::Done);
        assert!(wf.state().is_terminal());
        assert_eq!(wf.history().len(), 7);
    }

    #[test]
    fn accepted_input_cannot_skip_to_done() {
        let mut wf = QueryWorkflow::new();
        wf.filter(&accepted()).unwrap();
        assert!(wf.finish().is_err());
        assert_eq!(wf.state(), WorkflowStep::Filtered);
    }

    #[test]
    fn pending_then_rejected() {
        let mut wf = QueryWorkflow::new();
        wf.filter(&accepted()).unwrap();
        wf.mark_queried().unwrap();
        wf.mark_responded().unwrap();
        let decision = GateDecision::Pending {
            reasons: vec![ReviewReason::LowConfidence],
            review_priority: ReviewPriority::High,
        };
        assert_eq!(wf.route(&decision).unwrap(), WorkflowStep::ApprovalPending);
        assert!(wf.mark_memory_written().is_err());
        wf.reject().unwrap();
        wf.finish().unwrap();
        assert!(!wf.history().contains(&WorkflowStep::MemoryWritten));
    }

    #[test]
    fn failed_transition_keeps_state() {
        let mut wf = QueryWorkflow::new();
        let err = wf.mark_responded().unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert_eq!(wf.state(), WorkflowStep::Intake);
        assert_eq!(wf.history(), &[WorkflowStep::Intake]);
    }

    #[test]
    fn approve_outside_review_is_rejected() {
        let mut wf = QueryWorkflow::new();
        wf.filter(&accepted()).unwrap();
        wf.mark_queried().unwrap();
        wf.mark_responded().unwrap();
        assert!(wf.approve().is_err());
        assert_eq!(wf.state(), WorkflowStep::Responded);
    }

    #[test]
    fn resume_from_pending_record() {
        let mut wf = QueryWorkflow::resume_pending(&pending_record(ApprovalStatus::Pending)).unwrap();
        assert_eq!(wf.query_id(), Some("qry-00000001"));
        wf.approve().unwrap();
        wf.mark_memory_written().unwrap();
        wf.finish().unwrap();
    }

    #[test]
    fn resume_refuses_decided_record() {
        assert!(QueryWorkflow::resume_pending(&pending_record(ApprovalStatus::Approved)).is_err());
    }
}
