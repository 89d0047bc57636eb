mod list;
mod start;
mod status;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SessionCommands;
use crate::context::AppContext;

/// Handle `medisyn session`.
pub async fn handle(
    action: &SessionCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        SessionCommands::Start {
            researcher,
            project,
            focus,
        } => start::run(researcher, project, focus, ctx, flags).await,
        SessionCommands::Status { session_id } => status::run(session_id, ctx, flags).await,
        SessionCommands::List {
            researcher,
            status,
            limit,
        } => list::run(researcher.as_deref(), status.as_deref(), *limit, ctx, flags).await,
    }
}
