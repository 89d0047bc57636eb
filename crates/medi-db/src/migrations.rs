//! Schema setup, run every time a database is opened.
//!
//! The SQL is compiled in and written with `IF NOT EXISTS`, so reopening an
//! existing file is a no-op.

use crate::MediDb;
use crate::error::DatabaseError;

/// Sessions, queries, responses, approvals, memory and audit tables.
const SCHEMA_V1: &str = include_str!("../migrations/001_initial.sql");

impl MediDb {
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        tracing::debug!("applying medisyn schema v1");
        self.conn
            .execute_batch(SCHEMA_V1)
            .await
            .map_err(|e| DatabaseError::Migration(format!("schema v1: {e}")))?;
        Ok(())
    }
}
