//! Long-term memory repository.
//!
//! The `memory_entries` table is an append-only log of approved exchanges.
//! Rows store only the response reference; reads join the query and response
//! text back in. Order is `(stored_at, seq)`.

use chrono::{DateTime, Utc};

use medi_core::entities::MemoryEntry;
use medi_core::ids::PREFIX_MEMORY;

use crate::error::DatabaseError;
use crate::helpers::{format_timestamp, parse_datetime, parse_enum, timestamp_now};
use crate::service::MediService;

const MEMORY_SELECT: &str = "SELECT m.id, m.session_id, m.query_id, q.text, q.query_type, \
     r.text, r.confidence, r.source, m.stored_at
     FROM memory_entries m
     JOIN queries q ON q.id = m.query_id
     JOIN responses r ON r.query_id = m.query_id";

/// An entry removed by [`MediService::delete_memory_before`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedMemory {
    pub id: String,
    pub session_id: String,
}

impl MediService {
    /// Append an approved exchange to a session's long-term memory.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the response does not exist or is already
    /// stored.
    pub async fn append_memory(
        &self,
        session_id: &str,
        query_id: &str,
    ) -> Result<MemoryEntry, DatabaseError> {
        let now = timestamp_now();
        let id = self.db().generate_id(PREFIX_MEMORY).await?;

        self.db()
            .conn()
            .execute(
                "INSERT INTO memory_entries (id, session_id, query_id, stored_at)
                 VALUES (?1, ?2, ?3, ?4)",
                libsql::params![id.as_str(), session_id, query_id, format_timestamp(&now)],
            )
            .await?;

        let sql = format!("{MEMORY_SELECT} WHERE m.id = ?1");
        let mut rows = self.db().conn().query(&sql, [id.as_str()]).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_memory(&row)
    }

    /// Every long-term entry of a session, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_memory(&self, session_id: &str) -> Result<Vec<MemoryEntry>, DatabaseError> {
        let sql = format!("{MEMORY_SELECT} WHERE m.session_id = ?1 ORDER BY m.stored_at, m.seq");
        let mut rows = self.db().conn().query(&sql, [session_id]).await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_memory(&row)?);
        }
        Ok(entries)
    }

    /// The most recent `limit` entries of a session, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn recent_memory(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<MemoryEntry>, DatabaseError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let sql = format!(
            "{MEMORY_SELECT} WHERE m.session_id = ?1
             ORDER BY m.stored_at DESC, m.seq DESC LIMIT ?2"
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params![session_id, limit])
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_memory(&row)?);
        }
        entries.reverse();
        Ok(entries)
    }

    /// Delete every entry stored before `cutoff`, across all sessions.
    ///
    /// Returns what was removed so callers can drop cached copies. Running it
    /// twice with the same cutoff removes nothing the second time.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the select or delete fails.
    pub async fn delete_memory_before(
        &self,
        cutoff: &DateTime<Utc>,
    ) -> Result<Vec<DeletedMemory>, DatabaseError> {
        let cutoff_text = format_timestamp(cutoff);
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, session_id FROM memory_entries WHERE stored_at < ?1",
                [cutoff_text.as_str()],
            )
            .await?;
        let mut deleted = Vec::new();
        while let Some(row) = rows.next().await? {
            deleted.push(DeletedMemory {
                id: row.get::<String>(0)?,
                session_id: row.get::<String>(1)?,
            });
        }

        if !deleted.is_empty() {
            self.db()
                .conn()
                .execute(
                    "DELETE FROM memory_entries WHERE stored_at < ?1",
                    [cutoff_text.as_str()],
                )
                .await?;
        }

        tracing::debug!(cutoff = %cutoff_text, removed = deleted.len(), "memory cleanup");
        Ok(deleted)
    }

    /// Number of long-term entries for a session.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_memory(&self, session_id: &str) -> Result<i64, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM memory_entries WHERE session_id = ?1",
                [session_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)?)
    }
}

fn row_to_memory(row: &libsql::Row) -> Result<MemoryEntry, DatabaseError> {
    Ok(MemoryEntry {
        id: row.get::<String>(0)?,
        session_id: row.get::<String>(1)?,
        query_id: row.get::<String>(2)?,
        query_text: row.get::<String>(3)?,
        query_type: parse_enum(&row.get::<String>(4)?)?,
        response_text: row.get::<String>(5)?,
        confidence: row.get::<f64>(6)?,
        source: parse_enum(&row.get::<String>(7)?)?,
        stored_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}
