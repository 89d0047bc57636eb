//! Approval repository.
//!
//! Human review requests for responses the gate did not auto-approve.
//! Status transitions are validated against `ApprovalStatus::can_transition_to`
//! and guarded in SQL so a record can only leave `pending` once.

use chrono::{DateTime, Utc};
use serde::Serialize;

use medi_core::entities::ApprovalRecord;
use medi_core::enums::{
    ApprovalDecision, ApprovalStatus, AuditAction, EntityType, QueryType, ReviewPriority,
    ReviewReason,
};
use medi_core::ids::PREFIX_APPROVAL;

use crate::error::DatabaseError;
use crate::helpers::{
    format_timestamp, get_opt_string, parse_datetime, parse_enum, parse_json_list,
    parse_optional_datetime, timestamp_now, to_json_text,
};
use crate::service::MediService;

/// A pending approval joined with what the reviewer needs to decide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingReview {
    pub approval: ApprovalRecord,
    pub session_id: String,
    pub query_text: String,
    pub query_type: QueryType,
    pub response_text: String,
    pub confidence: f64,
}

/// Approval totals for a session, or for the whole database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalSummary {
    pub total: i64,
    pub approved: i64,
    pub rejected: i64,
    pub pending: i64,
    /// `approved / total`, 0 when there are no approvals.
    pub approval_rate: f64,
    /// Mean seconds between request and decision over decided records.
    pub average_review_secs: Option<f64>,
}

const APPROVAL_COLUMNS: &str = "a.id, a.query_id, a.status, a.reasons, a.review_priority, \
     a.reviewer, a.feedback, a.created_at, a.decided_at";

impl MediService {
    /// Open a pending approval for a stored response.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the response does not exist, already has an
    /// approval, or the audit append fails.
    pub async fn create_approval(
        &self,
        session_id: &str,
        query_id: &str,
        reasons: &[ReviewReason],
        review_priority: ReviewPriority,
    ) -> Result<ApprovalRecord, DatabaseError> {
        let now = timestamp_now();
        let id = self.db().generate_id(PREFIX_APPROVAL).await?;
        let reasons_json = to_json_text(reasons)?;

        self.db()
            .conn()
            .execute(
                "INSERT INTO approvals (id, query_id, status, reasons, review_priority, created_at)
                 VALUES (?1, ?2, 'pending', ?3, ?4, ?5)",
                libsql::params![
                    id.as_str(),
                    query_id,
                    reasons_json.as_str(),
                    review_priority.as_str(),
                    format_timestamp(&now)
                ],
            )
            .await?;

        self.record_audit(
            Some(session_id),
            EntityType::Approval,
            &id,
            AuditAction::ApprovalRequested,
            Some(serde_json::json!({
                "query_id": query_id,
                "reasons": reasons,
                "review_priority": review_priority,
            })),
        )
        .await?;

        Ok(ApprovalRecord {
            id,
            query_id: query_id.to_string(),
            status: ApprovalStatus::Pending,
            reasons: reasons.to_vec(),
            review_priority,
            reviewer: None,
            feedback: None,
            created_at: now,
            decided_at: None,
        })
    }

    /// Get the approval record attached to a query.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the query has no approval.
    pub async fn get_approval_by_query(
        &self,
        query_id: &str,
    ) -> Result<ApprovalRecord, DatabaseError> {
        let sql = format!("SELECT {APPROVAL_COLUMNS} FROM approvals a WHERE a.query_id = ?1");
        let mut rows = self.db().conn().query(&sql, [query_id]).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_approval(&row)
    }

    /// Record a reviewer's decision on a pending approval.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the query has no approval and
    /// `DatabaseError::InvalidState` if it was already decided.
    pub async fn decide_approval(
        &self,
        query_id: &str,
        decision: ApprovalDecision,
        reviewer: &str,
        feedback: Option<&str>,
    ) -> Result<ApprovalRecord, DatabaseError> {
        let current = self.get_approval_by_query(query_id).await?;
        let next = decision.status();
        if !current.status.can_transition_to(next) {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot transition approval {} from {} to {next}",
                current.id, current.status
            )));
        }

        let now = timestamp_now();
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE approvals SET status = ?1, reviewer = ?2, feedback = ?3, decided_at = ?4
                 WHERE id = ?5 AND status = 'pending'",
                libsql::params![
                    next.as_str(),
                    reviewer,
                    feedback,
                    format_timestamp(&now),
                    current.id.as_str()
                ],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::InvalidState(format!(
                "approval {} was decided concurrently",
                current.id
            )));
        }

        let session_id = self.get_query(query_id).await?.session_id;
        let action = match decision {
            ApprovalDecision::Approved => AuditAction::Approved,
            ApprovalDecision::Rejected => AuditAction::Rejected,
        };
        self.record_audit(
            Some(&session_id),
            EntityType::Approval,
            &current.id,
            action,
            Some(serde_json::json!({
                "query_id": query_id,
                "reviewer": reviewer,
                "feedback": feedback,
            })),
        )
        .await?;

        tracing::info!(
            approval_id = %current.id,
            query_id,
            decision = %decision,
            reviewer,
            "approval decided"
        );

        Ok(ApprovalRecord {
            status: next,
            reviewer: Some(reviewer.to_string()),
            feedback: feedback.map(str::to_string),
            decided_at: Some(now),
            ..current
        })
    }

    /// Pending approvals oldest first, optionally limited to one session.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_pending_reviews(
        &self,
        session_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<PendingReview>, DatabaseError> {
        let mut params: Vec<libsql::Value> = Vec::new();
        let session_filter = match session_id {
            Some(sid) => {
                params.push(libsql::Value::Text(sid.to_string()));
                "AND q.session_id = ?1"
            }
            None => "",
        };
        let sql = format!(
            "SELECT {APPROVAL_COLUMNS}, q.session_id, q.text, q.query_type, r.text, r.confidence
             FROM approvals a
             JOIN queries q ON q.id = a.query_id
             JOIN responses r ON r.query_id = a.query_id
             WHERE a.status = 'pending' {session_filter}
             ORDER BY a.created_at, a.rowid LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut reviews = Vec::new();
        while let Some(row) = rows.next().await? {
            reviews.push(PendingReview {
                approval: row_to_approval(&row)?,
                session_id: row.get::<String>(9)?,
                query_text: row.get::<String>(10)?,
                query_type: parse_enum(&row.get::<String>(11)?)?,
                response_text: row.get::<String>(12)?,
                confidence: row.get::<f64>(13)?,
            });
        }
        Ok(reviews)
    }

    /// Approval totals and approval rate.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn approval_summary(
        &self,
        session_id: Option<&str>,
    ) -> Result<ApprovalSummary, DatabaseError> {
        let mut params: Vec<libsql::Value> = Vec::new();
        let session_filter = match session_id {
            Some(sid) => {
                params.push(libsql::Value::Text(sid.to_string()));
                "WHERE q.session_id = ?1"
            }
            None => "",
        };
        let sql = format!(
            "SELECT {APPROVAL_COLUMNS}
             FROM approvals a JOIN queries q ON q.id = a.query_id {session_filter}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(row_to_approval(&row)?);
        }
        Ok(summarize(&records))
    }
}

fn summarize(records: &[ApprovalRecord]) -> ApprovalSummary {
    let count = |status: ApprovalStatus| {
        i64::try_from(records.iter().filter(|r| r.status == status).count()).unwrap_or(i64::MAX)
    };
    let total = i64::try_from(records.len()).unwrap_or(i64::MAX);
    let approved = count(ApprovalStatus::Approved);

    let review_times: Vec<f64> = records
        .iter()
        .filter_map(|r| r.decided_at.map(|d| review_secs(r.created_at, d)))
        .collect();
    let average_review_secs = if review_times.is_empty() {
        None
    } else {
        #[allow(clippy::cast_precision_loss)]
        let n = review_times.len() as f64;
        Some(review_times.iter().sum::<f64>() / n)
    };

    #[allow(clippy::cast_precision_loss)]
    let approval_rate = if total > 0 {
        approved as f64 / total as f64
    } else {
        0.0
    };

    ApprovalSummary {
        total,
        approved,
        rejected: count(ApprovalStatus::Rejected),
        pending: count(ApprovalStatus::Pending),
        approval_rate,
        average_review_secs,
    }
}

#[allow(clippy::cast_precision_loss)]
fn review_secs(created: DateTime<Utc>, decided: DateTime<Utc>) -> f64 {
    (decided - created).num_microseconds().unwrap_or(i64::MAX) as f64 / 1_000_000.0
}

fn row_to_approval(row: &libsql::Row) -> Result<ApprovalRecord, DatabaseError> {
    Ok(ApprovalRecord {
        id: row.get::<String>(0)?,
        query_id: row.get::<String>(1)?,
        status: parse_enum(&row.get::<String>(2)?)?,
        reasons: parse_json_list(&row.get::<String>(3)?)?,
        review_priority: parse_enum(&row.get::<String>(4)?)?,
        reviewer: get_opt_string(row, 5)?,
        feedback: get_opt_string(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        decided_at: parse_optional_datetime(get_opt_string(row, 8)?.as_deref())?,
    })
}
