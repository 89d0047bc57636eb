//! General application configuration.

use serde::{Deserialize, Serialize};

fn default_app_name() -> String {
    "MediSyn Labs Healthcare Research Assistant".to_string()
}

/// Default result limit.
const fn default_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Display name used in report headers.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Default result limit for list commands.
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            default_limit: default_limit(),
        }
    }
}
