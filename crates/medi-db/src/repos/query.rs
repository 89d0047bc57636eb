//! Query repository. Query records are immutable once inserted.

use medi_core::entities::QueryRecord;
use medi_core::enums::{Priority, QueryType};
use medi_core::ids::PREFIX_QUERY;

use crate::error::DatabaseError;
use crate::helpers::{format_timestamp, parse_datetime, parse_enum, timestamp_now};
use crate::service::MediService;

const QUERY_COLUMNS: &str = "id, session_id, text, query_type, priority, submitted_at";

impl MediService {
    /// Store a query that passed the message filter.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails (e.g. unknown session).
    pub async fn insert_query(
        &self,
        session_id: &str,
        text: &str,
        query_type: QueryType,
        priority: Priority,
    ) -> Result<QueryRecord, DatabaseError> {
        let now = timestamp_now();
        let id = self.db().generate_id(PREFIX_QUERY).await?;

        self.db()
            .conn()
            .execute(
                "INSERT INTO queries (id, session_id, text, query_type, priority, submitted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    id.as_str(),
                    session_id,
                    text,
                    query_type.as_str(),
                    priority.as_str(),
                    format_timestamp(&now)
                ],
            )
            .await?;

        Ok(QueryRecord {
            id,
            session_id: session_id.to_string(),
            text: text.to_string(),
            query_type,
            priority,
            submitted_at: now,
        })
    }

    /// Get a query by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the query does not exist.
    pub async fn get_query(&self, id: &str) -> Result<QueryRecord, DatabaseError> {
        let sql = format!("SELECT {QUERY_COLUMNS} FROM queries WHERE id = ?1");
        let mut rows = self.db().conn().query(&sql, [id]).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_query(&row)
    }

    /// All queries of a session in submission order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_queries(&self, session_id: &str) -> Result<Vec<QueryRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {QUERY_COLUMNS} FROM queries WHERE session_id = ?1
             ORDER BY submitted_at, rowid"
        );
        let mut rows = self.db().conn().query(&sql, [session_id]).await?;
        let mut queries = Vec::new();
        while let Some(row) = rows.next().await? {
            queries.push(row_to_query(&row)?);
        }
        Ok(queries)
    }
}

fn row_to_query(row: &libsql::Row) -> Result<QueryRecord, DatabaseError> {
    Ok(QueryRecord {
        id: row.get::<String>(0)?,
        session_id: row.get::<String>(1)?,
        text: row.get::<String>(2)?,
        query_type: parse_enum(&row.get::<String>(3)?)?,
        priority: parse_enum(&row.get::<String>(4)?)?,
        submitted_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}
