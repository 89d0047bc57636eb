use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::SessionStatus;

/// A research session opened by one researcher for one project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub researcher_id: String,
    pub project_id: String,
    pub disease_focus: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}
