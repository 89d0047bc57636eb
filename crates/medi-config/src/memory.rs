//! Memory and persistence configuration.

use serde::{Deserialize, Serialize};

fn default_database_path() -> String {
    "medisyn_memory.db".to_string()
}

const fn default_max_short_term() -> usize {
    7
}

const fn default_retention_days() -> u32 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemoryConfig {
    /// libSQL database file, or `:memory:`.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Bound of the per-session short-term queue.
    #[serde(default = "default_max_short_term")]
    pub max_short_term: usize,

    /// Entries handed to the query handler as conversation context.
    #[serde(default = "default_max_short_term")]
    pub context_limit: usize,

    /// Long-term entries older than this are removed by `cleanup`.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            max_short_term: default_max_short_term(),
            context_limit: default_max_short_term(),
            retention_days: default_retention_days(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = MemoryConfig::default();
        assert_eq!(config.max_short_term, 7);
        assert_eq!(config.context_limit, 7);
        assert_eq!(config.retention_days, 30);
    }
}
