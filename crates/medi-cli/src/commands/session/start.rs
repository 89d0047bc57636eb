use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    researcher: &str,
    project: &str,
    focus: &str,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if focus.trim().is_empty() {
        anyhow::bail!("--focus must not be empty");
    }
    let session = ctx.assistant.start_session(researcher, project, focus).await?;
    output(&session, flags.format)
}
