use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use memrun_graph::ChartLayout;
use memrun_metrics::{Aggregate, CounterReadings, Sample, aggregate};

use crate::platform::Platform;

use super::config::RunPlan;
use super::cycle::run_cycle;
use super::error::{Error, Result};
use super::report::MetricsCsv;
use super::session::Session;

/// Result of one target/iteration measurement cycle, retained for the
/// session's end-of-run summary.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub target: String,
    pub iteration: u32,
    pub load_threshold_ms: Option<f64>,
    pub load_complete_ms: f64,
    pub peaks: CounterReadings,
    pub steady: CounterReadings,
    pub samples: Vec<Sample>,
    /// `None` when the chart was skipped or its export failed.
    pub image_path: Option<PathBuf>,
}

/// Runs the whole target × iteration matrix against one platform.
///
/// Runs execute strictly sequentially: they share one counter source family
/// and the cleanup step, and overlapping them would contaminate each other's
/// peak and steady-state readings. A cleanup pass separates consecutive runs.
/// Chart export failures are logged and absorbed: the matrix always runs to
/// completion and the CSV log is the artifact that must survive.
pub async fn run_matrix<P: Platform>(platform: &P, plan: &RunPlan) -> Result<Vec<RunRecord>> {
    if plan.targets.is_empty() {
        return Err(Error::NoTargets);
    }
    if plan.iterations == 0 {
        return Err(Error::InvalidIterations);
    }

    let session = Session::create(&platform.results_root())?;
    let mut csv = session.open_metrics()?;
    tracing::info!(dir = %session.run_dir().display(), "benchmark session started");

    platform
        .cleanup(plan.force_reclaim_before_run, plan.unload_unused)
        .await;

    let mut records = Vec::with_capacity(plan.targets.len() * plan.iterations as usize);
    for target in &plan.targets {
        for iteration in 1..=plan.iterations {
            let record = run_one(platform, &session, &mut csv, target, iteration, plan).await?;
            records.push(record);

            platform.cleanup(false, plan.unload_unused).await;
        }
    }

    csv.flush()?;
    tracing::info!(dir = %session.run_dir().display(), "benchmark done");

    Ok(records)
}

async fn run_one<P: Platform>(
    platform: &P,
    session: &Session,
    csv: &mut MetricsCsv<BufWriter<File>>,
    target: &str,
    iteration: u32,
    plan: &RunPlan,
) -> Result<RunRecord> {
    let source = platform.create_source();
    let outcome = run_cycle(
        source,
        || platform.begin_load(target),
        plan.sample_interval,
        plan.stabilization,
    )
    .await;

    let Aggregate { peaks, steady } = aggregate(&outcome.samples);
    tracing::debug!(
        run_target = target,
        iteration,
        samples = outcome.samples.len(),
        load_ms = outcome.load_complete_ms,
        "run complete"
    );

    let run_id = format!("{target}_{iteration}");
    csv.load90(
        &run_id,
        target,
        iteration,
        outcome.load_start_ms,
        outcome.load_threshold_ms,
    )?;
    csv.load_done(
        &run_id,
        target,
        iteration,
        outcome.load_start_ms + outcome.load_complete_ms,
        outcome.load_complete_ms,
        &peaks,
    )?;
    let last_ms = outcome.samples.last().map_or(0.0, |s| s.time_ms);
    csv.post_activate(&run_id, target, iteration, last_ms, &steady, &peaks)?;
    for sample in &outcome.samples {
        csv.sample(&run_id, target, iteration, sample)?;
    }
    csv.flush()?;

    let layout = ChartLayout::with_title(format!(
        "{target} iter {iteration} load {:.0} ms peak reserved {:.1} MB",
        outcome.load_complete_ms, peaks.reserved_mb,
    ));
    let graph_path = session.graph_path(target, iteration);
    let image_path = match memrun_graph::save_chart(&outcome.samples, &layout, &graph_path) {
        Ok(true) => Some(graph_path),
        Ok(false) => None,
        Err(err) => {
            tracing::warn!("graph export failed for {run_id}: {err}");
            None
        }
    };

    Ok(RunRecord {
        target: target.to_string(),
        iteration,
        load_threshold_ms: outcome.load_threshold_ms,
        load_complete_ms: outcome.load_complete_ms,
        peaks,
        steady,
        samples: outcome.samples,
        image_path,
    })
}
