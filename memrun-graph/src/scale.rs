/// Snaps a raw axis step to a human-readable value: {1, 2, 5, 10} x 10^n.
///
/// The thresholds (1.5, 3, 7) pick the smallest breakpoint that keeps the
/// gridline count near the requested division target. Scale-invariant:
/// `nice_step(raw * 10) == nice_step(raw) * 10`.
#[must_use]
pub fn nice_step(raw: f64) -> f64 {
    if raw <= 0.0 {
        // Callers widen degenerate ranges first; a positive step keeps any
        // gridline walk finite regardless.
        return 1.0;
    }

    let exp = 10f64.powf(raw.log10().floor());
    let f = raw / exp;
    let nice = if f < 1.5 {
        1.0
    } else if f < 3.0 {
        2.0
    } else if f < 7.0 {
        5.0
    } else {
        10.0
    };

    nice * exp
}

/// Axis domain and gridline spacing, derived per render from the data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScale {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl AxisScale {
    /// Value axis: `[0, y_max]` with all-zero data floored to 1, targeting
    /// five divisions.
    #[must_use]
    pub fn value(y_max: f64) -> Self {
        let max = if y_max <= 0.0 { 1.0 } else { y_max };
        Self {
            min: 0.0,
            max,
            step: nice_step(max / 5.0),
        }
    }

    /// Time axis: `[t_min, t_max]` with a degenerate range widened by 1 ms,
    /// targeting six divisions.
    #[must_use]
    pub fn time(t_min: f64, t_max: f64) -> Self {
        let max = if t_max <= t_min { t_min + 1.0 } else { t_max };
        Self {
            min: t_min,
            max,
            step: nice_step((max - t_min) / 6.0),
        }
    }

    #[must_use]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}
