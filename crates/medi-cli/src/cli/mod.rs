use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `medisyn` binary.
#[derive(Debug, Parser)]
#[command(
    name = "medisyn",
    version,
    about = "MediSyn - healthcare research assistant with human review"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database path, overriding memory.database_path
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Force mock mode regardless of configuration
    #[arg(long, global = true)]
    pub mock: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            database: self.database.clone(),
            mock: self.mock,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::subcommands::{ApprovalCommands, SessionCommands};
    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "medisyn",
            "--format",
            "table",
            "--limit",
            "5",
            "--verbose",
            "session",
            "list",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.limit, Some(5));
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Session {
                action: SessionCommands::List { .. }
            }
        ));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "medisyn", "cleanup", "--format", "raw", "--quiet", "--mock", "--database", "x.db",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        let flags = cli.global_flags();
        assert!(flags.mock);
        assert_eq!(flags.database.as_deref(), Some("x.db"));
    }

    #[test]
    fn query_defaults() {
        let cli = Cli::try_parse_from([
            "medisyn",
            "query",
            "ses-0000abcd",
            "metformin dosing in ckd",
        ])
        .expect("cli should parse");
        let Commands::Query(args) = cli.command else {
            panic!("expected query command");
        };
        assert_eq!(args.query_type, "clinical-question");
        assert_eq!(args.priority, "medium");
        assert_eq!(args.text, "metformin dosing in ckd");
    }

    #[test]
    fn resolve_requires_decision_and_reviewer() {
        assert!(Cli::try_parse_from(["medisyn", "approval", "resolve", "qry-1"]).is_err());

        let cli = Cli::try_parse_from([
            "medisyn",
            "approval",
            "resolve",
            "qry-1",
            "--decision",
            "rejected",
            "--reviewer",
            "dr-lee",
        ])
        .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Approval {
                action: ApprovalCommands::Resolve { .. }
            }
        ));
    }

    #[test]
    fn session_start_needs_all_fields() {
        assert!(Cli::try_parse_from(["medisyn", "session", "start", "--researcher", "dr"]).is_err());
        assert!(
            Cli::try_parse_from([
                "medisyn",
                "session",
                "start",
                "--researcher",
                "dr",
                "--project",
                "p",
                "--focus",
                "asthma",
            ])
            .is_ok()
        );
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        assert!(Cli::try_parse_from(["medisyn", "--format", "xml", "config", "show"]).is_err());
    }
}
