use strum::IntoEnumIterator;

use crate::{Counter, CounterReadings, Sample};

/// Peak and steady-state reduction of one run's sample sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aggregate {
    /// Per-counter maximum across the run.
    pub peaks: CounterReadings,

    /// Counter values from the final sample.
    pub steady: CounterReadings,
}

/// Reduces a sample sequence to per-counter peaks and the last ("steady
/// state") reading.
///
/// An empty sequence reduces to all zeros rather than an error. No smoothing
/// or outlier rejection: a max/last reduction is the whole contract, and
/// because both values come from the same sequence, `peaks` dominates
/// `steady` for every counter.
#[must_use]
pub fn aggregate(samples: &[Sample]) -> Aggregate {
    let mut peaks = CounterReadings::default();
    for sample in samples {
        for counter in Counter::iter() {
            let v = sample.counters.get(counter);
            if v > peaks.get(counter) {
                peaks.set(counter, v);
            }
        }
    }

    let steady = samples.last().map(|s| s.counters).unwrap_or_default();

    Aggregate { peaks, steady }
}
