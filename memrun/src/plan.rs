use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;

use memrun_core::RunMode;
use memrun_core::runner::RunPlan;

use crate::cli::{ModeArg, RunArgs};

/// On-disk benchmark plan.
///
/// Field defaults mirror [`RunPlan`]'s; CLI flags override whatever the file
/// says.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanFile {
    pub targets: Vec<String>,

    #[serde(default = "default_iterations")]
    pub iterations: u32,

    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    #[serde(default = "default_stabilization_ms")]
    pub stabilization_ms: u64,

    #[serde(default = "default_true")]
    pub unload_unused: bool,

    #[serde(default = "default_true")]
    pub force_reclaim_before_run: bool,

    /// Host platform: auto, system or sim.
    #[serde(default)]
    pub mode: Option<String>,
}

fn default_iterations() -> u32 {
    3
}

fn default_sample_interval_ms() -> u64 {
    50
}

fn default_stabilization_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

pub async fn load(path: &Path) -> anyhow::Result<PlanFile> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read plan: {}", path.display()))?;
    parse(&text).with_context(|| format!("failed to parse plan: {}", path.display()))
}

fn parse(text: &str) -> anyhow::Result<PlanFile> {
    Ok(serde_yaml::from_str(text)?)
}

/// CLI flags take precedence over the plan file.
pub fn resolve(plan: PlanFile, args: &RunArgs) -> RunPlan {
    RunPlan {
        targets: plan.targets,
        iterations: args.iterations.unwrap_or(plan.iterations),
        sample_interval: args
            .sample_interval
            .unwrap_or(Duration::from_millis(plan.sample_interval_ms)),
        stabilization: args
            .stabilization
            .unwrap_or(Duration::from_millis(plan.stabilization_ms)),
        force_reclaim_before_run: plan.force_reclaim_before_run,
        unload_unused: plan.unload_unused,
    }
}

/// Mode precedence: explicit CLI flag, then the plan, then auto.
pub fn resolve_mode(plan_mode: Option<&str>, cli_mode: Option<ModeArg>) -> anyhow::Result<RunMode> {
    if let Some(mode) = cli_mode {
        return Ok(match mode {
            ModeArg::Auto => RunMode::Auto,
            ModeArg::System => RunMode::System,
            ModeArg::Sim => RunMode::Sim,
        });
    }

    match plan_mode {
        Some(s) => s
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid `mode` in plan: `{s}` (expected auto, system or sim)")),
        None => Ok(RunMode::Auto),
    }
}
