use clap::Subcommand;

/// Research session commands.
#[derive(Clone, Debug, Subcommand)]
pub enum SessionCommands {
    /// Start a new research session.
    Start {
        /// Researcher identifier.
        #[arg(long)]
        researcher: String,
        /// Project identifier.
        #[arg(long)]
        project: String,
        /// Disease or condition the session focuses on.
        #[arg(long)]
        focus: String,
    },
    /// Show counts and memory state for a session.
    Status {
        /// Session ID.
        session_id: String,
    },
    /// List sessions, newest first.
    List {
        /// Only sessions of this researcher.
        #[arg(long)]
        researcher: Option<String>,
        /// Status filter: active, archived.
        #[arg(long)]
        status: Option<String>,
        /// Maximum number of sessions.
        #[arg(long)]
        limit: Option<u32>,
    },
}

/// Human review commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ApprovalCommands {
    /// List responses waiting for review.
    List {
        /// Only this session.
        #[arg(long)]
        session: Option<String>,
        /// Maximum number of reviews.
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Approve or reject a pending response.
    Resolve {
        /// Query ID whose response is under review.
        query_id: String,
        /// Decision: approved, rejected.
        #[arg(long)]
        decision: String,
        /// Reviewer identifier.
        #[arg(long)]
        reviewer: String,
        /// Free-text feedback stored with the decision.
        #[arg(long)]
        feedback: Option<String>,
    },
    /// Approval totals and rate.
    Summary {
        /// Only this session.
        #[arg(long)]
        session: Option<String>,
    },
}

/// Configuration commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration with secrets masked.
    Show,
}
