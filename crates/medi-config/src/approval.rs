//! Human-in-the-loop approval configuration.

use serde::{Deserialize, Serialize};

const fn default_confidence_threshold() -> f64 {
    0.7
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApprovalConfig {
    /// Responses scoring below this go to a reviewer.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Route every critical-priority query to a reviewer.
    #[serde(default = "default_true")]
    pub critical_requires_review: bool,

    /// Added to the built-in sensitivity keyword list.
    #[serde(default)]
    pub extra_sensitive_keywords: Vec<String>,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            critical_requires_review: true,
            extra_sensitive_keywords: Vec::new(),
        }
    }
}
