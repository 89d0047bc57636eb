use medi_core::enums::ApprovalDecision;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ApprovalCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `medisyn approval`.
pub async fn handle(
    action: &ApprovalCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ApprovalCommands::List { session, limit } => {
            let limit = effective_limit(*limit, flags.limit, ctx.config().general.default_limit);
            let pending = ctx
                .assistant
                .pending_approvals(session.as_deref(), limit)
                .await?;
            output(&pending, flags.format)
        }
        ApprovalCommands::Resolve {
            query_id,
            decision,
            reviewer,
            feedback,
        } => {
            let decision: ApprovalDecision = parse_enum(decision, "decision")?;
            let resolved = ctx
                .assistant
                .resolve_approval(query_id, decision, reviewer, feedback.as_deref())
                .await?;
            output(&resolved, flags.format)
        }
        ApprovalCommands::Summary { session } => {
            let summary = ctx.assistant.approval_summary(session.as_deref()).await?;
            output(&summary, flags.format)
        }
    }
}
