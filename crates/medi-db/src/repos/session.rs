//! Session repository.
//!
//! Manages the session lifecycle: start, lookup, listing, archival of stale
//! sessions, and per-session statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use medi_core::entities::Session;
use medi_core::enums::{AuditAction, EntityType, SessionStatus};
use medi_core::ids::PREFIX_SESSION;

use crate::error::DatabaseError;
use crate::helpers::{format_timestamp, parse_datetime, parse_enum, timestamp_now};
use crate::service::MediService;

/// Aggregate counts for one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    pub total_queries: i64,
    pub total_responses: i64,
    pub memory_entries: i64,
    pub pending_approvals: i64,
    /// Mean confidence over all responses, `None` when there are none.
    pub average_confidence: Option<f64>,
}

const SESSION_COLUMNS: &str = "id, researcher_id, project_id, disease_focus, status, created_at";

impl MediService {
    /// Start a new active session.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT or its audit entry fails.
    pub async fn create_session(
        &self,
        researcher_id: &str,
        project_id: &str,
        disease_focus: &str,
    ) -> Result<Session, DatabaseError> {
        let now = timestamp_now();
        let id = self.db().generate_id(PREFIX_SESSION).await?;

        self.db()
            .conn()
            .execute(
                "INSERT INTO sessions (id, researcher_id, project_id, disease_focus, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, 'active', ?5)",
                libsql::params![
                    id.as_str(),
                    researcher_id,
                    project_id,
                    disease_focus,
                    format_timestamp(&now)
                ],
            )
            .await?;

        self.record_audit(
            Some(&id),
            EntityType::Session,
            &id,
            AuditAction::SessionStarted,
            Some(serde_json::json!({
                "researcher_id": researcher_id,
                "project_id": project_id,
            })),
        )
        .await?;

        tracing::info!(session_id = %id, researcher_id, project_id, "session started");

        Ok(Session {
            id,
            researcher_id: researcher_id.to_string(),
            project_id: project_id.to_string(),
            disease_focus: disease_focus.to_string(),
            status: SessionStatus::Active,
            created_at: now,
        })
    }

    /// Get a session by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the session does not exist.
    pub async fn get_session(&self, id: &str) -> Result<Session, DatabaseError> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1");
        let mut rows = self.db().conn().query(&sql, [id]).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_session(&row)
    }

    /// List sessions newest first, optionally filtered by researcher and status.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_sessions(
        &self,
        researcher_id: Option<&str>,
        status: Option<SessionStatus>,
        limit: u32,
    ) -> Result<Vec<Session>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(researcher) = researcher_id {
            params.push(libsql::Value::Text(researcher.to_string()));
            conditions.push(format!("researcher_id = ?{}", params.len()));
        }
        if let Some(s) = status {
            params.push(libsql::Value::Text(s.as_str().to_string()));
            conditions.push(format!("status = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next().await? {
            sessions.push(row_to_session(&row)?);
        }
        Ok(sessions)
    }

    /// Archive active sessions created before `cutoff` that no longer hold
    /// any long-term memory or pending approval.
    ///
    /// Returns the IDs that changed status. Already archived sessions are
    /// left alone, so repeated calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the update or audit append fails.
    pub async fn archive_sessions_before(
        &self,
        cutoff: &DateTime<Utc>,
    ) -> Result<Vec<String>, DatabaseError> {
        let cutoff_text = format_timestamp(cutoff);
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id FROM sessions s
                 WHERE s.status = 'active' AND s.created_at < ?1
                   AND NOT EXISTS (SELECT 1 FROM memory_entries m WHERE m.session_id = s.id)
                   AND NOT EXISTS (
                       SELECT 1 FROM approvals a JOIN queries q ON q.id = a.query_id
                       WHERE q.session_id = s.id AND a.status = 'pending'
                   )",
                [cutoff_text.as_str()],
            )
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }

        for id in &ids {
            let current: SessionStatus = self.get_session(id).await?.status;
            if !current.can_transition_to(SessionStatus::Archived) {
                return Err(DatabaseError::InvalidState(format!(
                    "Cannot transition session {id} from {current} to archived"
                )));
            }
            self.db()
                .conn()
                .execute(
                    "UPDATE sessions SET status = 'archived' WHERE id = ?1",
                    [id.as_str()],
                )
                .await?;
            self.record_audit(
                Some(id),
                EntityType::Session,
                id,
                AuditAction::SessionArchived,
                Some(serde_json::json!({"from": "active", "to": "archived"})),
            )
            .await?;
        }

        Ok(ids)
    }

    /// Aggregate counts for a session.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if an aggregate query fails.
    pub async fn session_stats(&self, session_id: &str) -> Result<SessionStats, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT
                    (SELECT COUNT(*) FROM queries WHERE session_id = ?1),
                    (SELECT COUNT(*) FROM responses r
                        JOIN queries q ON q.id = r.query_id WHERE q.session_id = ?1),
                    (SELECT COUNT(*) FROM memory_entries WHERE session_id = ?1),
                    (SELECT COUNT(*) FROM approvals a
                        JOIN queries q ON q.id = a.query_id
                        WHERE q.session_id = ?1 AND a.status = 'pending'),
                    (SELECT AVG(r.confidence) FROM responses r
                        JOIN queries q ON q.id = r.query_id WHERE q.session_id = ?1)",
                [session_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(SessionStats {
            total_queries: row.get::<i64>(0)?,
            total_responses: row.get::<i64>(1)?,
            memory_entries: row.get::<i64>(2)?,
            pending_approvals: row.get::<i64>(3)?,
            average_confidence: row.get::<Option<f64>>(4)?,
        })
    }
}

/// Convert a libSQL row to a `Session` struct.
fn row_to_session(row: &libsql::Row) -> Result<Session, DatabaseError> {
    Ok(Session {
        id: row.get::<String>(0)?,
        researcher_id: row.get::<String>(1)?,
        project_id: row.get::<String>(2)?,
        disease_focus: row.get::<String>(3)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}
