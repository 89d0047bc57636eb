use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Session { action } => commands::session::handle(&action, ctx, flags).await,
        Commands::Query(args) => commands::query::handle(&args, ctx, flags).await,
        Commands::Approval { action } => commands::approval::handle(&action, ctx, flags).await,
        Commands::Report(args) => commands::report::handle(&args, ctx, flags).await,
        Commands::Cleanup(args) => commands::cleanup::handle(&args, ctx, flags).await,
        Commands::Config { action } => commands::config::handle(&action, ctx.config(), flags),
    }
}

#[cfg(test)]
mod tests {
    use medi_config::MediConfig;
    use pretty_assertions::assert_eq;

    use super::dispatch;
    use crate::cli::root_commands::{CleanupArgs, Commands, QueryArgs, ReportArgs};
    use crate::cli::subcommands::{ApprovalCommands, SessionCommands};
    use crate::cli::{GlobalFlags, OutputFormat};
    use crate::context::AppContext;

    fn flags() -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            limit: None,
            quiet: true,
            verbose: false,
            database: None,
            mock: true,
        }
    }

    async fn context() -> AppContext {
        AppContext::init(MediConfig::for_testing()).await.unwrap()
    }

    #[tokio::test]
    async fn session_query_and_report_write_a_file() {
        let mut ctx = context().await;
        let flags = flags();
        let session = ctx
            .assistant
            .start_session("dr-lee", "proj-1", "asthma")
            .await
            .unwrap();

        dispatch(
            Commands::Query(QueryArgs {
                session_id: session.id.clone(),
                text: "What is the first-line controller therapy for asthma?".into(),
                query_type: "clinical-question".into(),
                priority: "medium".into(),
            }),
            &mut ctx,
            &flags,
        )
        .await
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        dispatch(
            Commands::Report(ReportArgs {
                session_id: session.id.clone(),
                report_format: Some("csv".into()),
                out: Some(dir.path().display().to_string()),
                stdout: false,
            }),
            &mut ctx,
            &flags,
        )
        .await
        .unwrap();

        let written = std::fs::read_to_string(dir.path().join(format!("{}_report.csv", session.id)))
            .unwrap();
        assert_eq!(written.lines().next(), Some("entry_id,query_id,query_type,query_text,response_text,confidence,source,stored_at"));
        assert!(written.contains("controller therapy for asthma"));
    }

    #[tokio::test]
    async fn invalid_enum_values_are_rejected() {
        let mut ctx = context().await;
        let err = dispatch(
            Commands::Query(QueryArgs {
                session_id: "ses-missing".into(),
                text: "What dose of metformin is typical?".into(),
                query_type: "gossip".into(),
                priority: "medium".into(),
            }),
            &mut ctx,
            &flags(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("invalid type 'gossip'"));

        let err = dispatch(
            Commands::Approval {
                action: ApprovalCommands::Resolve {
                    query_id: "qry-1".into(),
                    decision: "maybe".into(),
                    reviewer: "rev".into(),
                    feedback: None,
                },
            },
            &mut ctx,
            &flags(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("invalid decision 'maybe'"));
    }

    #[tokio::test]
    async fn listing_and_cleanup_succeed_on_empty_store() {
        let mut ctx = context().await;
        let flags = flags();
        dispatch(
            Commands::Session {
                action: SessionCommands::List {
                    researcher: None,
                    status: Some("active".into()),
                    limit: None,
                },
            },
            &mut ctx,
            &flags,
        )
        .await
        .unwrap();
        dispatch(
            Commands::Cleanup(CleanupArgs {
                older_than_days: Some(30),
            }),
            &mut ctx,
            &flags,
        )
        .await
        .unwrap();
    }
}
