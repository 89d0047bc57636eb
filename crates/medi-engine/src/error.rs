//! Error taxonomy for the assistant engine.
//!
//! Crate-level errors converge here. A filter rejection is not an error; it
//! comes back as `QueryOutcome::Filtered`.

use medi_config::ConfigError;
use medi_core::errors::CoreError;
use medi_db::error::DatabaseError;
use medi_llm::LlmError;

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// A workflow or approval transition that the state machine forbids.
    #[error("state violation: {0}")]
    StateViolation(String),

    /// The query handler gave up after exhausting its retries.
    #[error("query handler failed: {0}")]
    HandlerFailure(#[from] LlmError),

    #[error("persistence failure: {0}")]
    PersistenceFailure(DatabaseError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("report serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DatabaseError> for AssistantError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::InvalidState(msg) => Self::StateViolation(msg),
            other => Self::PersistenceFailure(other),
        }
    }
}

impl From<CoreError> for AssistantError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidTransition { .. } | CoreError::Validation(_) => {
                Self::StateViolation(err.to_string())
            }
            CoreError::NotFound { id, .. } => Self::NotFound { entity: "entity", id },
            CoreError::Other(e) => Self::PersistenceFailure(DatabaseError::Other(e)),
        }
    }
}

/// Map a missing row to `NotFound` for the named entity, everything else
/// through the usual conversion.
pub(crate) fn lookup<T>(
    result: Result<T, DatabaseError>,
    entity: &'static str,
    id: &str,
) -> Result<T, AssistantError> {
    result.map_err(|err| match err {
        DatabaseError::NoResult => AssistantError::NotFound {
            entity,
            id: id.to_string(),
        },
        other => other.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_becomes_state_violation() {
        let err: AssistantError = DatabaseError::InvalidState("already approved".into()).into();
        assert!(matches!(err, AssistantError::StateViolation(_)));
    }

    #[test]
    fn missing_row_becomes_not_found() {
        let err = lookup::<()>(Err(DatabaseError::NoResult), "session", "ses-1").unwrap_err();
        assert_eq!(err.to_string(), "session not found: ses-1");
    }

    #[test]
    fn query_failures_stay_persistence_errors() {
        let err = lookup::<()>(Err(DatabaseError::Query("boom".into())), "session", "x").unwrap_err();
        assert!(matches!(err, AssistantError::PersistenceFailure(_)));
    }
}
