//! # medi-config
//!
//! Layered configuration loading for MediSyn using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`MEDISYN_*` prefix, `__` as separator)
//! 2. The bare `GOOGLE_API_KEY` variable, mapped to `llm.api_key`
//! 3. Project-level `.medisyn/config.toml`
//! 4. User-level `~/.config/medisyn/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `MEDISYN_LLM__MOCK` -> `llm.mock`,
//! `MEDISYN_APPROVAL__CONFIDENCE_THRESHOLD` -> `approval.confidence_threshold`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use medi_config::MediConfig;
//!
//! let config = MediConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//!
//! if !config.llm.mock {
//!     println!("Gemini model: {}", config.llm.model);
//! }
//! ```
//!
//! A loaded `MediConfig` is never mutated afterwards; components receive a
//! clone or a reference at construction time.

mod approval;
mod error;
mod general;
mod llm;
mod memory;
mod report;

pub use approval::ApprovalConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use llm::LlmConfig;
pub use memory::MemoryConfig;
pub use report::ReportConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder shown instead of secrets in [`MediConfig::redacted`].
pub const REDACTED: &str = "***";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MediConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub approval: ApprovalConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl MediConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed or a
    /// value has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".medisyn/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: the conventional Gemini key variable
        figment = figment.merge(
            Env::raw()
                .only(&["GOOGLE_API_KEY"])
                .map(|_| "llm.api_key".into()),
        );

        // Layer 4: Prefixed environment variables (highest priority)
        figment.merge(Env::prefixed("MEDISYN_").split("__"))
    }

    /// Configuration for tests: mock LLM, in-memory database.
    #[must_use]
    pub fn for_testing() -> Self {
        let mut config = Self::default();
        config.llm.mock = true;
        config.memory.database_path = ":memory:".to_string();
        config
    }

    /// Check cross-field constraints figment cannot express.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NotConfigured`] when live mode is selected without an API key.
    /// - [`ConfigError::InvalidValue`] for a threshold outside `(0, 1]` or a
    ///   zero-sized short-term memory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.llm.mock && !self.llm.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: "llm".to_string(),
            });
        }

        let threshold = self.approval.confidence_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "approval.confidence_threshold".to_string(),
                reason: format!("{threshold} is outside (0, 1]"),
            });
        }

        if self.memory.max_short_term == 0 {
            return Err(ConfigError::InvalidValue {
                field: "memory.max_short_term".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.memory.context_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "memory.context_limit".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// A copy safe to print: secrets replaced with [`REDACTED`].
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.llm.api_key.is_empty() {
            copy.llm.api_key = REDACTED.to_string();
        }
        copy
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("medisyn").join("config.toml"))
    }

    /// Walk up from `CARGO_MANIFEST_DIR` looking for `.env`, then fall back
    /// to the current directory. Missing files are ignored.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
