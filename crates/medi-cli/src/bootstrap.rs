use anyhow::Context;
use medi_config::MediConfig;

use crate::cli::GlobalFlags;

/// Load `.env`, layered config, then apply command-line overrides.
///
/// The result is validated and never changed afterwards.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<MediConfig> {
    let mut config = MediConfig::load_with_dotenv().context("failed to load configuration")?;
    apply_overrides(&mut config, flags);
    config.validate().context("invalid configuration")?;
    tracing::debug!(
        mock = config.llm.mock,
        database = %config.memory.database_path,
        "configuration loaded"
    );
    Ok(config)
}

fn apply_overrides(config: &mut MediConfig, flags: &GlobalFlags) {
    if let Some(path) = &flags.database {
        config.memory.database_path.clone_from(path);
    }
    if flags.mock {
        config.llm.mock = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    fn flags() -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            limit: None,
            quiet: false,
            verbose: false,
            database: None,
            mock: false,
        }
    }

    #[test]
    fn database_flag_replaces_configured_path() {
        let mut config = MediConfig::default();
        let flags = GlobalFlags {
            database: Some("/tmp/other.db".into()),
            ..flags()
        };
        apply_overrides(&mut config, &flags);
        assert_eq!(config.memory.database_path, "/tmp/other.db");
    }

    #[test]
    fn mock_flag_only_turns_mock_on() {
        let mut config = MediConfig::default();
        config.llm.mock = false;
        apply_overrides(&mut config, &flags());
        assert!(!config.llm.mock);

        let flags = GlobalFlags {
            mock: true,
            ..flags()
        };
        apply_overrides(&mut config, &flags);
        assert!(config.llm.mock);
    }
}
