use medi_core::enums::{Priority, QueryType};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::QueryArgs;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `medisyn query`.
pub async fn handle(args: &QueryArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let query_type: QueryType = parse_enum(&args.query_type, "type")?;
    let priority: Priority = parse_enum(&args.priority, "priority")?;

    let outcome = ctx
        .assistant
        .process_query(&args.session_id, &args.text, query_type, priority)
        .await?;
    output(&outcome, flags.format)
}
