use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{ApprovalStatus, ReviewPriority, ReviewReason};

/// A human review request for a response the gate did not auto-approve.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ApprovalRecord {
    pub id: String,
    pub query_id: String,
    pub status: ApprovalStatus,
    pub reasons: Vec<ReviewReason>,
    pub review_priority: ReviewPriority,
    pub reviewer: Option<String>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}
