use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use memrun_metrics::Sample;

use crate::cancel::CancelToken;
use crate::load::LoadHandle;
use crate::source::CounterSource;

/// Progress fraction whose first observation marks the threshold timing
/// point.
pub const PROGRESS_THRESHOLD: f64 = 0.9;

/// Granularity of one cooperative scheduling step. Also the floor for the
/// sampling cadence.
const STEP: Duration = Duration::from_millis(1);

/// Everything one measurement cycle produced.
#[derive(Debug)]
pub struct CycleOutcome {
    /// Captured samples, ordered by capture time.
    pub samples: Vec<Sample>,

    /// Elapsed ms on the run timer when the load was started.
    pub load_start_ms: f64,

    /// Elapsed ms from load start to the first poll at or above
    /// [`PROGRESS_THRESHOLD`]; `None` when the load completed without the
    /// threshold ever being observed (e.g. a single-step load).
    pub load_threshold_ms: Option<f64>,

    /// Elapsed ms from load start to completion.
    pub load_complete_ms: f64,
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}

/// Drives one measurement cycle to completion: a periodic sampler, the load
/// operation's progress monitor, and a post-load stabilization window,
/// interleaved cooperatively.
///
/// Sampling starts before the load so the sequence carries a pre-load
/// baseline, and keeps running through stabilization. The counter source is
/// owned by the sampling task for the whole cycle and disposed when it ends.
/// When the stabilization window elapses the sampler is cancelled outright.
///
/// Sample timestamps and the two load marks come from the same timer but are
/// not interleaved atomically: a sample can land on either side of the
/// completion mark within one scheduling step.
pub async fn run_cycle(
    mut source: Box<dyn CounterSource>,
    begin_load: impl FnOnce() -> Box<dyn LoadHandle>,
    sample_interval: Duration,
    stabilization: Duration,
) -> CycleOutcome {
    let started = Instant::now();
    source.start();

    let cancel = Arc::new(CancelToken::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let sampler = tokio::spawn(sample_loop(
        source,
        started,
        sample_interval.max(STEP),
        Arc::clone(&cancel),
        tx,
    ));

    let load_start_ms = elapsed_ms(started);
    let mut handle = begin_load();

    let mut step = tokio::time::interval(STEP);
    step.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut load_threshold_ms = None;
    while !handle.is_done() {
        if load_threshold_ms.is_none() && handle.progress() >= PROGRESS_THRESHOLD {
            load_threshold_ms = Some(elapsed_ms(started) - load_start_ms);
        }
        step.tick().await;
    }
    let load_complete_ms = elapsed_ms(started) - load_start_ms;

    // The stabilization window accrues the time each step actually took, so
    // under host load the window stretches with the steps instead of ending
    // after a fixed number of them.
    let mut settled = Duration::ZERO;
    let mut last = Instant::now();
    while settled < stabilization {
        step.tick().await;
        let now = Instant::now();
        settled += now - last;
        last = now;
    }

    cancel.cancel();
    let _ = sampler.await;

    let mut samples = Vec::new();
    while let Ok(sample) = rx.try_recv() {
        samples.push(sample);
    }

    CycleOutcome {
        samples,
        load_start_ms,
        load_threshold_ms,
        load_complete_ms,
    }
}

async fn sample_loop(
    mut source: Box<dyn CounterSource>,
    started: Instant,
    interval: Duration,
    cancel: Arc<CancelToken>,
    tx: mpsc::UnboundedSender<Sample>,
) {
    let mut tick = tokio::time::interval(interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = tick.tick() => {
                if cancel.is_cancelled() {
                    break;
                }
                match source.read() {
                    // Timestamps record actual elapsed time, not the nominal
                    // cadence point.
                    Ok(counters) => {
                        let _ = tx.send(Sample::new(elapsed_ms(started), counters));
                    }
                    Err(err) => tracing::debug!("skipping sample: {err}"),
                }
            }
        }
    }
}
