//! Response repository. One response per query, keyed by `query_id`.

use medi_core::entities::ResponseRecord;

use crate::error::DatabaseError;
use crate::helpers::{format_timestamp, parse_datetime, parse_enum};
use crate::service::MediService;

impl MediService {
    /// Store the response generated for a query.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for a confidence outside `[0, 1]`,
    /// or a libSQL error if the query is unknown or already answered.
    pub async fn insert_response(&self, response: &ResponseRecord) -> Result<(), DatabaseError> {
        if !(0.0..=1.0).contains(&response.confidence) {
            return Err(DatabaseError::InvalidState(format!(
                "confidence {} for query {} is outside [0, 1]",
                response.confidence, response.query_id
            )));
        }

        self.db()
            .conn()
            .execute(
                "INSERT INTO responses (query_id, text, confidence, source, generated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![
                    response.query_id.as_str(),
                    response.text.as_str(),
                    response.confidence,
                    response.source.as_str(),
                    format_timestamp(&response.generated_at)
                ],
            )
            .await?;
        Ok(())
    }

    /// Get the response for a query.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the query has no response.
    pub async fn get_response(&self, query_id: &str) -> Result<ResponseRecord, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT query_id, text, confidence, source, generated_at
                 FROM responses WHERE query_id = ?1",
                [query_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(ResponseRecord {
            query_id: row.get::<String>(0)?,
            text: row.get::<String>(1)?,
            confidence: row.get::<f64>(2)?,
            source: parse_enum(&row.get::<String>(3)?)?,
            generated_at: parse_datetime(&row.get::<String>(4)?)?,
        })
    }
}
