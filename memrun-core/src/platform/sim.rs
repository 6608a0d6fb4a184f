use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;

use memrun_metrics::CounterReadings;

use crate::load::LoadHandle;
use crate::platform::Platform;
use crate::source::{CounterSource, ReadError};

/// Deterministic platform for tests and dry runs.
///
/// Counters are a pure function of elapsed time and the load reports linear
/// progress over a fixed duration, so whole sessions replay identically
/// (including under tokio's paused test clock).
#[derive(Debug, Clone)]
pub struct SimPlatform {
    results_root: PathBuf,
    load_duration: Duration,
}

impl SimPlatform {
    #[must_use]
    pub fn new(results_root: impl Into<PathBuf>) -> Self {
        Self {
            results_root: results_root.into(),
            load_duration: Duration::from_millis(100),
        }
    }

    #[must_use]
    pub fn with_load_duration(mut self, load_duration: Duration) -> Self {
        self.load_duration = load_duration;
        self
    }
}

impl Platform for SimPlatform {
    fn results_root(&self) -> PathBuf {
        self.results_root.clone()
    }

    fn create_source(&self) -> Box<dyn CounterSource> {
        Box::new(SimSource { started: None })
    }

    fn begin_load(&self, _target: &str) -> Box<dyn LoadHandle> {
        Box::new(SimLoadHandle {
            started: Instant::now(),
            duration: self.load_duration,
        })
    }

    fn cleanup(
        &self,
        _force_reclaim: bool,
        _unload_unused: bool,
    ) -> impl std::future::Future<Output = ()> + Send {
        async {
            tokio::task::yield_now().await;
        }
    }
}

struct SimSource {
    started: Option<Instant>,
}

impl CounterSource for SimSource {
    fn start(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    fn read(&mut self) -> Result<CounterReadings, ReadError> {
        let elapsed_ms = self
            .started
            .map_or(0.0, |s| s.elapsed().as_secs_f64() * 1000.0);

        // Ramp toward a plateau over the first 100 ms, the rough shape of a
        // load spike settling. SystemUsed stays zero, the shape hosts without
        // that counter produce.
        let ramp = (elapsed_ms / 100.0).min(1.0);
        Ok(CounterReadings {
            allocated_mb: 64.0 + 96.0 * ramp,
            reserved_mb: 128.0 + 64.0 * ramp,
            managed_mb: 24.0 + 16.0 * ramp,
            system_mb: 0.0,
        })
    }
}

struct SimLoadHandle {
    started: Instant,
    duration: Duration,
}

impl LoadHandle for SimLoadHandle {
    fn progress(&mut self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.started.elapsed().as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    fn is_done(&mut self) -> bool {
        self.started.elapsed() >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn load_progress_is_linear_until_done() {
        let platform = SimPlatform::new(".").with_load_duration(Duration::from_millis(100));
        let mut handle = platform.begin_load("anything");

        assert!(!handle.is_done());
        assert!(handle.progress() < 0.01);

        tokio::time::advance(Duration::from_millis(50)).await;
        assert!((handle.progress() - 0.5).abs() < 0.02);
        assert!(!handle.is_done());

        tokio::time::advance(Duration::from_millis(50)).await;
        assert!(handle.is_done());
        assert!((handle.progress() - 1.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn source_ramp_is_monotone_and_idempotent_to_start() {
        let mut source = SimSource { started: None };
        source.start();
        let first = match source.read() {
            Ok(r) => r,
            Err(err) => panic!("sim read failed: {err}"),
        };

        tokio::time::advance(Duration::from_millis(60)).await;
        // start() again must not reset the ramp.
        source.start();
        let later = match source.read() {
            Ok(r) => r,
            Err(err) => panic!("sim read failed: {err}"),
        };

        assert!(later.allocated_mb > first.allocated_mb);
        assert!(later.reserved_mb > first.reserved_mb);
        assert_eq!(later.system_mb, 0.0);
    }
}
