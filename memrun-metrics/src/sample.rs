use crate::CounterReadings;

/// One timestamped snapshot of all tracked counters.
///
/// `time_ms` is the actual elapsed time on the run's shared timer at capture,
/// not the nominal cadence point; cooperative scheduling jitter means the two
/// can differ. Within a run, samples are ordered by it (non-decreasing).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub time_ms: f64,
    pub counters: CounterReadings,
}

impl Sample {
    #[must_use]
    pub fn new(time_ms: f64, counters: CounterReadings) -> Self {
        Self { time_ms, counters }
    }
}
