use std::path::PathBuf;

use medi_core::enums::ReportFormat;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ReportArgs;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;

#[derive(Debug, Serialize)]
struct WrittenReport {
    session_id: String,
    format: ReportFormat,
    path: PathBuf,
}

/// Handle `medisyn report`.
pub async fn handle(args: &ReportArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let format = match &args.report_format {
        Some(raw) => parse_enum::<ReportFormat>(raw, "report format")?,
        None => ctx.config().report.default_format,
    };
    let report = ctx.assistant.generate_report(&args.session_id, format).await?;

    if args.stdout {
        print!("{}", report.content);
        return Ok(());
    }

    let dir = args
        .out
        .clone()
        .unwrap_or_else(|| ctx.config().report.output_dir.clone());
    let path = report.write_to(&PathBuf::from(dir))?;
    tracing::info!(path = %path.display(), "report written");
    crate::output::output(
        &WrittenReport {
            session_id: args.session_id.clone(),
            format,
            path,
        },
        flags.format,
    )
}
