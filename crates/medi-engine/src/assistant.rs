//! The research assistant facade.
//!
//! `Assistant` owns the pipeline for one process: filter → handler → gate →
//! memory, with reviewer decisions and reports on the side. Every query
//! drives its own [`QueryWorkflow`], whose history comes back in the outcome.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use medi_config::MediConfig;
use medi_core::entities::{ApprovalRecord, MemoryEntry, QueryRecord, ResponseRecord, Session};
use medi_core::enums::{
    ApprovalDecision, AuditAction, EntityType, Priority, QueryType, ReportFormat, SessionStatus,
    WorkflowStep,
};
use medi_db::helpers::timestamp_now;
use medi_db::repos::approval::{ApprovalSummary, PendingReview};
use medi_db::repos::session::SessionStats;
use medi_db::service::MediService;
use serde::Serialize;

use crate::approval::{
    ApprovalGate, GateDecision, SensitivityPolicy, estimated_review_minutes, review_criteria,
};
use crate::error::{AssistantError, lookup};
use crate::filter::{FilterVerdict, MessageFilter, is_duplicate};
use crate::handler::QueryHandler;
use crate::memory::MemoryManager;
use crate::report::{Report, ReportGenerator};
use crate::workflow::QueryWorkflow;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of submitting one query.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// The filter rejected the input; nothing was stored.
    Filtered {
        verdict: FilterVerdict,
        steps: Vec<WorkflowStep>,
    },
    /// Stored in long-term memory without review.
    AutoApproved {
        query: QueryRecord,
        response: ResponseRecord,
        memory_entry: MemoryEntry,
        steps: Vec<WorkflowStep>,
    },
    /// Waiting for a reviewer.
    PendingApproval {
        query: QueryRecord,
        response: ResponseRecord,
        approval: ApprovalRecord,
        criteria: Vec<String>,
        estimated_review_minutes: u32,
        steps: Vec<WorkflowStep>,
    },
}

/// What a query's transaction wrote besides the query and response.
enum Stored {
    Memory(MemoryEntry),
    Approval(ApprovalRecord),
}

impl QueryOutcome {
    #[must_use]
    pub fn steps(&self) -> &[WorkflowStep] {
        match self {
            Self::Filtered { steps, .. }
            | Self::AutoApproved { steps, .. }
            | Self::PendingApproval { steps, .. } => steps,
        }
    }

    #[must_use]
    pub const fn query(&self) -> Option<&QueryRecord> {
        match self {
            Self::Filtered { .. } => None,
            Self::AutoApproved { query, .. } | Self::PendingApproval { query, .. } => Some(query),
        }
    }
}

/// Result of a reviewer decision.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveOutcome {
    pub approval: ApprovalRecord,
    /// Present only for approvals.
    pub memory_entry: Option<MemoryEntry>,
    pub steps: Vec<WorkflowStep>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
    pub cutoff: DateTime<Utc>,
    pub memory_entries_removed: usize,
    pub sessions_archived: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatusView {
    pub session: Session,
    pub stats: SessionStats,
    pub short_term_len: usize,
    pub short_term_max: usize,
    pub short_term_trimmed: bool,
}

// ---------------------------------------------------------------------------
// Assistant
// ---------------------------------------------------------------------------

pub struct Assistant {
    config: MediConfig,
    service: Arc<MediService>,
    filter: MessageFilter,
    handler: QueryHandler,
    gate: ApprovalGate,
    memory: MemoryManager,
    reports: ReportGenerator,
}

impl Assistant {
    /// Open the configured database and build the configured handler.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::Config` for an invalid configuration,
    /// `PersistenceFailure` if the database cannot be opened, or
    /// `HandlerFailure` if the live client cannot be built.
    pub async fn open(config: MediConfig) -> Result<Self, AssistantError> {
        config.validate()?;
        let service = MediService::new_local(&config.memory.database_path).await?;
        let handler = QueryHandler::from_config(&config.llm)?;
        tracing::info!(
            database = %config.memory.database_path,
            mode = %handler.source(),
            "assistant ready"
        );
        Ok(Self::with_parts(config, Arc::new(service), handler))
    }

    /// Assemble from an existing service and handler.
    #[must_use]
    pub fn with_parts(config: MediConfig, service: Arc<MediService>, handler: QueryHandler) -> Self {
        let gate = ApprovalGate::from_config(&config.approval);
        let memory = MemoryManager::new(Arc::clone(&service), config.memory.max_short_term);
        let reports = ReportGenerator::new(config.general.app_name.clone());
        Self {
            config,
            service,
            filter: MessageFilter::new(),
            handler,
            gate,
            memory,
            reports,
        }
    }

    /// Replace the sensitivity policy used by the approval gate.
    #[must_use]
    pub fn with_sensitivity_policy(mut self, policy: Box<dyn SensitivityPolicy>) -> Self {
        self.gate = ApprovalGate::with_policy(&self.config.approval, policy);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &MediConfig {
        &self.config
    }

    #[must_use]
    pub const fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    #[must_use]
    pub fn service(&self) -> &MediService {
        &self.service
    }

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `PersistenceFailure` if the session cannot be stored.
    pub async fn start_session(
        &mut self,
        researcher_id: &str,
        project_id: &str,
        disease_focus: &str,
    ) -> Result<Session, AssistantError> {
        let session = self
            .service
            .create_session(researcher_id, project_id, disease_focus)
            .await?;
        self.memory.hydrate(&session.id).await?;
        tracing::info!(
            session_id = %session.id,
            researcher_id,
            disease_focus,
            "session started"
        );
        Ok(session)
    }

    async fn active_session(&mut self, session_id: &str) -> Result<Session, AssistantError> {
        let session = lookup(self.service.get_session(session_id).await, "session", session_id)?;
        if session.status != SessionStatus::Active {
            return Err(AssistantError::StateViolation(format!(
                "session {session_id} is {}",
                session.status
            )));
        }
        self.ensure_loaded(session_id).await?;
        Ok(session)
    }

    async fn ensure_loaded(&mut self, session_id: &str) -> Result<(), AssistantError> {
        if !self.memory.is_loaded(session_id) {
            self.memory.hydrate(session_id).await?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `NotFound` for an unknown session.
    pub async fn session_status(
        &mut self,
        session_id: &str,
    ) -> Result<SessionStatusView, AssistantError> {
        let session = lookup(self.service.get_session(session_id).await, "session", session_id)?;
        self.ensure_loaded(session_id).await?;
        let stats = self.service.session_stats(session_id).await?;
        Ok(SessionStatusView {
            session,
            stats,
            short_term_len: self.memory.short_term_len(session_id),
            short_term_max: self.memory.max_short_term(),
            short_term_trimmed: self.memory.was_trimmed(session_id),
        })
    }

    /// # Errors
    ///
    /// Returns `PersistenceFailure` if the read fails.
    pub async fn list_sessions(
        &self,
        researcher_id: Option<&str>,
        status: Option<SessionStatus>,
        limit: u32,
    ) -> Result<Vec<Session>, AssistantError> {
        Ok(self.service.list_sessions(researcher_id, status, limit).await?)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Run one query through filter, handler and approval gate.
    ///
    /// Filtered input returns `QueryOutcome::Filtered` without touching the
    /// handler or the database.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown session, `StateViolation` for an
    /// archived one, `HandlerFailure` when the model cannot answer, and
    /// `PersistenceFailure` when a write fails.
    pub async fn process_query(
        &mut self,
        session_id: &str,
        text: &str,
        query_type: QueryType,
        priority: Priority,
    ) -> Result<QueryOutcome, AssistantError> {
        let mut workflow = QueryWorkflow::new();
        let verdict = self.filter.classify(text);
        workflow.filter(&verdict)?;

        if !verdict.is_informational() {
            workflow.finish()?;
            tracing::info!(
                session_id,
                classification = %verdict.classification,
                reason = %verdict.reason,
                "query filtered"
            );
            return Ok(QueryOutcome::Filtered {
                verdict,
                steps: workflow.history().to_vec(),
            });
        }

        let session = self.active_session(session_id).await?;
        let context = self
            .memory
            .get_context(session_id, self.config.memory.context_limit);
        if let Some(previous) = context
            .iter()
            .rev()
            .find(|entry| is_duplicate(&verdict.cleaned_text, &entry.query_text))
        {
            tracing::warn!(
                session_id,
                duplicate_of = %previous.query_id,
                "query repeats a recent one"
            );
        }

        workflow.mark_queried()?;
        let answer = self
            .handler
            .process(
                &verdict.cleaned_text,
                query_type,
                Some(&session.disease_focus),
                &context,
            )
            .await?;

        let service = self.service.as_ref();
        let gate = &self.gate;
        let memory = &self.memory;
        let text = verdict.cleaned_text.as_str();
        let (query, response, decision, stored) = service
            .in_transaction(|| async move {
                let query = service
                    .insert_query(session_id, text, query_type, priority)
                    .await?;
                let response = ResponseRecord {
                    query_id: query.id.clone(),
                    text: answer.text,
                    confidence: answer.confidence,
                    source: answer.source,
                    generated_at: timestamp_now(),
                };
                service.insert_response(&response).await?;

                let decision = gate.evaluate(&response, priority);
                let stored = match &decision {
                    GateDecision::AutoApproved => {
                        Stored::Memory(memory.persist(session_id, &query, &response).await?)
                    }
                    GateDecision::Pending {
                        reasons,
                        review_priority,
                    } => Stored::Approval(
                        service
                            .create_approval(session_id, &query.id, reasons, *review_priority)
                            .await?,
                    ),
                };
                Ok((query, response, decision, stored))
            })
            .await?;

        workflow.set_query_id(&query.id);
        workflow.mark_responded()?;
        workflow.route(&decision)?;

        match stored {
            Stored::Memory(memory_entry) => {
                self.memory.remember(&memory_entry).await?;
                workflow.mark_memory_written()?;
                workflow.finish()?;
                tracing::info!(
                    session_id,
                    query_id = %query.id,
                    confidence = response.confidence,
                    "response auto-approved"
                );
                Ok(QueryOutcome::AutoApproved {
                    query,
                    response,
                    memory_entry,
                    steps: workflow.history().to_vec(),
                })
            }
            Stored::Approval(approval) => {
                tracing::info!(
                    session_id,
                    query_id = %query.id,
                    confidence = response.confidence,
                    review_priority = %approval.review_priority,
                    "response awaiting review"
                );
                Ok(QueryOutcome::PendingApproval {
                    criteria: review_criteria(query_type)
                        .iter()
                        .map(|c| (*c).to_string())
                        .collect(),
                    estimated_review_minutes: estimated_review_minutes(query_type),
                    query,
                    response,
                    approval,
                    steps: workflow.history().to_vec(),
                })
            }
        }
    }

    // -----------------------------------------------------------------------
    // Approvals
    // -----------------------------------------------------------------------

    /// Apply a reviewer's decision to a pending response.
    ///
    /// Approved responses go to memory. Rejected ones stay out of memory;
    /// the decision itself is on the audit trail.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the query has no approval record and
    /// `StateViolation` if it was already decided.
    pub async fn resolve_approval(
        &mut self,
        query_id: &str,
        decision: ApprovalDecision,
        reviewer: &str,
        feedback: Option<&str>,
    ) -> Result<ResolveOutcome, AssistantError> {
        let pending = lookup(
            self.service.get_approval_by_query(query_id).await,
            "approval for query",
            query_id,
        )?;
        let mut workflow = QueryWorkflow::resume_pending(&pending)?;
        let query = lookup(self.service.get_query(query_id).await, "query", query_id)?;

        let service = self.service.as_ref();
        let memory = &self.memory;
        let query = &query;
        let (approval, memory_entry) = service
            .in_transaction(|| async move {
                let approval = service
                    .decide_approval(query_id, decision, reviewer, feedback)
                    .await?;
                let entry = match decision {
                    ApprovalDecision::Approved => {
                        let response = service.get_response(query_id).await?;
                        Some(memory.persist(&query.session_id, query, &response).await?)
                    }
                    ApprovalDecision::Rejected => None,
                };
                Ok((approval, entry))
            })
            .await?;

        match &memory_entry {
            Some(entry) => {
                workflow.approve()?;
                self.memory.remember(entry).await?;
                workflow.mark_memory_written()?;
            }
            None => {
                workflow.reject()?;
            }
        }
        workflow.finish()?;

        tracing::info!(query_id, reviewer, %decision, "approval resolved");
        Ok(ResolveOutcome {
            approval,
            memory_entry,
            steps: workflow.history().to_vec(),
        })
    }

    /// # Errors
    ///
    /// Returns `PersistenceFailure` if the read fails.
    pub async fn pending_approvals(
        &self,
        session_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<PendingReview>, AssistantError> {
        Ok(self.service.list_pending_reviews(session_id, limit).await?)
    }

    /// # Errors
    ///
    /// Returns `PersistenceFailure` if the read fails.
    pub async fn approval_summary(
        &self,
        session_id: Option<&str>,
    ) -> Result<ApprovalSummary, AssistantError> {
        Ok(self.service.approval_summary(session_id).await?)
    }

    // -----------------------------------------------------------------------
    // Reports and retention
    // -----------------------------------------------------------------------

    /// Render a session's long-term memory. Read-only.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown session or one with no entries.
    pub async fn generate_report(
        &self,
        session_id: &str,
        format: ReportFormat,
    ) -> Result<Report, AssistantError> {
        let session = lookup(self.service.get_session(session_id).await, "session", session_id)?;
        let entries = self.memory.long_term(session_id).await?;
        self.reports.render(&session, &entries, format)
    }

    /// Delete memory stored before `older_than` and archive sessions left
    /// empty by it. Safe to repeat.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailure` if a delete, update or audit write fails.
    pub async fn cleanup(
        &mut self,
        older_than: DateTime<Utc>,
    ) -> Result<CleanupReport, AssistantError> {
        let removed = self.memory.cleanup(&older_than).await?;
        let archived = self.service.archive_sessions_before(&older_than).await?;
        self.service
            .record_audit(
                None,
                EntityType::Memory,
                "retention",
                AuditAction::MemoryCleanup,
                Some(serde_json::json!({
                    "cutoff": older_than,
                    "memory_entries_removed": removed,
                    "sessions_archived": archived.len(),
                })),
            )
            .await?;
        tracing::info!(
            cutoff = %older_than,
            removed,
            archived = archived.len(),
            "cleanup finished"
        );
        Ok(CleanupReport {
            cutoff: older_than,
            memory_entries_removed: removed,
            sessions_archived: archived,
        })
    }

    /// Cleanup with the configured retention window.
    ///
    /// # Errors
    ///
    /// Same as [`Self::cleanup`].
    pub async fn cleanup_expired(&mut self) -> Result<CleanupReport, AssistantError> {
        let cutoff = Utc::now() - Duration::days(i64::from(self.config.memory.retention_days));
        self.cleanup(cutoff).await
    }
}
