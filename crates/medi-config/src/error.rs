//! Errors raised while loading or validating `MediConfig`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A provider failed to read or the merged layers did not fit `MediConfig`.
    #[error("failed to load medisyn configuration: {0}")]
    Figment(#[from] figment::Error),

    /// Live mode needs a section that has no usable values.
    #[error("section '{section}' must be configured when mock mode is off")]
    NotConfigured { section: String },

    #[error("{field} is invalid: {reason}")]
    InvalidValue { field: String, reason: String },
}
