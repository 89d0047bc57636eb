use clap::{Args, Subcommand};

use crate::cli::subcommands::{ApprovalCommands, ConfigCommands, SessionCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Research sessions.
    Session {
        #[command(subcommand)]
        action: SessionCommands,
    },
    /// Submit a research query.
    Query(QueryArgs),
    /// Human review of low-confidence or sensitive responses.
    Approval {
        #[command(subcommand)]
        action: ApprovalCommands,
    },
    /// Generate a session report.
    Report(ReportArgs),
    /// Delete expired memory and archive idle sessions.
    Cleanup(CleanupArgs),
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Arguments for `medisyn query`.
#[derive(Clone, Debug, Args)]
pub struct QueryArgs {
    /// Session ID.
    pub session_id: String,
    /// Question text.
    pub text: String,
    /// Query type: literature-search, treatment-comparison,
    /// clinical-question, general-medical.
    #[arg(long = "type", default_value = "clinical-question")]
    pub query_type: String,
    /// Priority: low, medium, high, critical.
    #[arg(long, default_value = "medium")]
    pub priority: String,
}

/// Arguments for `medisyn report`.
#[derive(Clone, Debug, Args)]
pub struct ReportArgs {
    /// Session ID.
    pub session_id: String,
    /// Report format: markdown, csv, json (defaults to config).
    #[arg(long)]
    pub report_format: Option<String>,
    /// Output directory (defaults to config).
    #[arg(long)]
    pub out: Option<String>,
    /// Print the report instead of writing a file.
    #[arg(long)]
    pub stdout: bool,
}

/// Arguments for `medisyn cleanup`.
#[derive(Clone, Debug, Args)]
pub struct CleanupArgs {
    /// Remove memory older than this many days (defaults to config).
    #[arg(long)]
    pub older_than_days: Option<u32>,
}
