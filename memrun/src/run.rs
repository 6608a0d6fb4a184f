use crate::cli::RunArgs;
use crate::exit_codes::ExitCode;
use crate::{plan, summary};

pub async fn run(args: RunArgs) -> anyhow::Result<ExitCode> {
    let plan_file = plan::load(&args.plan).await?;
    let mode = plan::resolve_mode(plan_file.mode.as_deref(), args.mode)?;
    let run_plan = plan::resolve(plan_file, &args);

    tracing::info!(?mode, targets = run_plan.targets.len(), iterations = run_plan.iterations, "starting benchmark");

    let platform = memrun_core::create_platform(mode, args.results_root.clone());
    let records = memrun_core::runner::run_matrix(&platform, &run_plan).await?;

    summary::print(&records);
    Ok(ExitCode::Success)
}
