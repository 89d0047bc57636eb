//! Service layer that owns the database handle.
//!
//! All repo methods are implemented as `impl MediService` blocks under
//! `repos/`. Mutations that matter to reviewers also append an audit entry.

use std::future::Future;

use crate::MediDb;
use crate::error::DatabaseError;

/// Entry point for all persistence operations.
pub struct MediService {
    db: MediDb,
}

impl MediService {
    /// Open (or create) a local database and wrap it.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = MediDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    /// Run `work` inside one transaction on the shared connection.
    ///
    /// Repo methods called from `work` go through the same connection, so
    /// their writes commit together or not at all.
    ///
    /// # Errors
    ///
    /// Returns the error from `work` after rolling back, or `DatabaseError`
    /// if the transaction cannot be opened or committed.
    pub async fn in_transaction<T, F, Fut>(&self, work: F) -> Result<T, DatabaseError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, DatabaseError>>,
    {
        let tx = self.db.conn().transaction().await?;
        match work().await {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &MediDb {
        &self.db
    }
}
