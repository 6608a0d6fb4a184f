use std::time::Duration;

/// Parameters for one benchmark session.
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Load targets; each runs `iterations` times, in order.
    pub targets: Vec<String>,

    /// 1-based iteration count per target.
    pub iterations: u32,

    /// Sampling cadence. Floored to 1 ms by the scheduler.
    pub sample_interval: Duration,

    /// Post-load stabilization window during which sampling continues.
    pub stabilization: Duration,

    /// Force a reclamation pass before the first run.
    pub force_reclaim_before_run: bool,

    /// Unload unused resources between runs.
    pub unload_unused: bool,
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            iterations: 3,
            sample_interval: Duration::from_millis(50),
            stabilization: Duration::from_millis(1000),
            force_reclaim_before_run: true,
            unload_unused: true,
        }
    }
}
