use chrono::{Duration, Utc};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::CleanupArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `medisyn cleanup`.
pub async fn handle(args: &CleanupArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = match args.older_than_days {
        Some(days) => {
            let cutoff = Utc::now() - Duration::days(i64::from(days));
            ctx.assistant.cleanup(cutoff).await?
        }
        None => ctx.assistant.cleanup_expired().await?,
    };
    output(&report, flags.format)
}
