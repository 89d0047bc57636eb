//! Report export configuration.

use medi_core::enums::ReportFormat;
use serde::{Deserialize, Serialize};

fn default_output_dir() -> String {
    "reports".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub default_format: ReportFormat,

    /// Directory reports are written to when no explicit path is given.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_format: ReportFormat::default(),
            output_dir: default_output_dir(),
        }
    }
}
