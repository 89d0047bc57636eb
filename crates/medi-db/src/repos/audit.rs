//! Audit trail repository.
//!
//! Append-only audit entries recording session, approval, and cleanup events.

use medi_core::entities::AuditEntry;
use medi_core::enums::{AuditAction, EntityType};
use medi_core::ids::PREFIX_AUDIT;

use crate::error::DatabaseError;
use crate::helpers::{
    format_timestamp, get_opt_string, parse_datetime, parse_enum, parse_optional_json,
    timestamp_now,
};
use crate::service::MediService;

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub session_id: Option<String>,
    pub limit: Option<u32>,
}

impl MediService {
    /// Append an audit entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit(&self, entry: &AuditEntry) -> Result<(), DatabaseError> {
        let detail = entry.detail.as_ref().map(ToString::to_string);
        self.db()
            .conn()
            .execute(
                "INSERT INTO audit_trail (id, session_id, entity_type, entity_id, action, detail, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                libsql::params![
                    entry.id.as_str(),
                    entry.session_id.as_deref(),
                    entry.entity_type.as_str(),
                    entry.entity_id.as_str(),
                    entry.action.as_str(),
                    detail.as_deref(),
                    format_timestamp(&entry.created_at)
                ],
            )
            .await?;
        Ok(())
    }

    /// Build and append an audit entry stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if ID generation or the INSERT fails.
    pub async fn record_audit(
        &self,
        session_id: Option<&str>,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<serde_json::Value>,
    ) -> Result<AuditEntry, DatabaseError> {
        let entry = AuditEntry {
            id: self.db().generate_id(PREFIX_AUDIT).await?,
            session_id: session_id.map(str::to_string),
            entity_type,
            entity_id: entity_id.to_string(),
            action,
            detail,
            created_at: timestamp_now(),
        };
        self.append_audit(&entry).await?;
        tracing::debug!(
            entity = %entity_type,
            entity_id,
            action = %action,
            "audit entry appended"
        );
        Ok(entry)
    }

    /// Query audit entries with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(
        &self,
        filter: &AuditFilter,
    ) -> Result<Vec<AuditEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref et) = filter.entity_type {
            params.push(libsql::Value::Text(et.as_str().to_string()));
            conditions.push(format!("entity_type = ?{}", params.len()));
        }
        if let Some(ref eid) = filter.entity_id {
            params.push(libsql::Value::Text(eid.clone()));
            conditions.push(format!("entity_id = ?{}", params.len()));
        }
        if let Some(ref action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action = ?{}", params.len()));
        }
        if let Some(ref sid) = filter.session_id {
            params.push(libsql::Value::Text(sid.clone()));
            conditions.push(format!("session_id = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, session_id, entity_type, entity_id, action, detail, created_at
             FROM audit_trail {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_audit(&row)?);
        }
        Ok(entries)
    }
}

fn row_to_audit(row: &libsql::Row) -> Result<AuditEntry, DatabaseError> {
    Ok(AuditEntry {
        id: row.get::<String>(0)?,
        session_id: get_opt_string(row, 1)?,
        entity_type: parse_enum(&row.get::<String>(2)?)?,
        entity_id: row.get::<String>(3)?,
        action: parse_enum(&row.get::<String>(4)?)?,
        detail: parse_optional_json(get_opt_string(row, 5)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{start_test_session, test_service};

    #[tokio::test]
    async fn session_start_is_audited() {
        let svc = test_service().await;
        let ses = start_test_session(&svc).await;

        let entries = svc
            .query_audit(&AuditFilter {
                session_id: Some(ses.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::SessionStarted);
        assert_eq!(entries[0].entity_id, ses);
    }

    #[tokio::test]
    async fn filters_combine() {
        let svc = test_service().await;
        let ses = start_test_session(&svc).await;
        svc.record_audit(
            Some(&ses),
            EntityType::Approval,
            "apr-00000001",
            AuditAction::Rejected,
            Some(serde_json::json!({"reviewer": "dr-lee"})),
        )
        .await
        .unwrap();

        let rejected = svc
            .query_audit(&AuditFilter {
                entity_type: Some(EntityType::Approval),
                action: Some(AuditAction::Rejected),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(rejected.len(), 1);
        assert_eq!(
            rejected[0].detail,
            Some(serde_json::json!({"reviewer": "dr-lee"}))
        );

        let none = svc
            .query_audit(&AuditFilter {
                entity_id: Some("apr-ffffffff".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn global_entries_have_no_session() {
        let svc = test_service().await;
        let entry = svc
            .record_audit(None, EntityType::Memory, "cleanup", AuditAction::MemoryCleanup, None)
            .await
            .unwrap();
        assert!(entry.session_id.is_none());

        let all = svc.query_audit(&AuditFilter::default()).await.unwrap();
        assert_eq!(all, vec![entry]);
    }
}
