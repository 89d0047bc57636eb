use medi_config::MediConfig;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ConfigCommands;
use crate::output::output;

/// Handle `medisyn config`. Needs no database.
pub fn handle(action: &ConfigCommands, config: &MediConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        ConfigCommands::Show => output(&config.redacted(), flags.format),
    }
}
