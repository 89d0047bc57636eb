use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{QueryType, ResponseSource};

/// One approved question/answer pair in a session's memory.
///
/// The long-term log row only stores `query_id` as the response reference;
/// the text fields are joined in on read so reports and prompt context can
/// use entries directly.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MemoryEntry {
    pub id: String,
    pub session_id: String,
    pub query_id: String,
    pub query_text: String,
    pub query_type: QueryType,
    pub response_text: String,
    pub confidence: f64,
    pub source: ResponseSource,
    pub stored_at: DateTime<Utc>,
}
