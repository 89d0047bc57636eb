use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Priority, QueryType};

/// A query that passed the message filter. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct QueryRecord {
    pub id: String,
    pub session_id: String,
    /// Normalized text as produced by the message filter.
    pub text: String,
    pub query_type: QueryType,
    pub priority: Priority,
    pub submitted_at: DateTime<Utc>,
}
