use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ResponseSource;

/// The answer generated for a query. Keyed by the query it answers.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ResponseRecord {
    pub query_id: String,
    pub text: String,
    /// Score in `[0, 1]`.
    pub confidence: f64,
    pub source: ResponseSource,
    pub generated_at: DateTime<Utc>,
}
