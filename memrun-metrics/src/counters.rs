/// One of the four tracked memory counters.
///
/// The set is closed on purpose: the chart renderer assigns one series and one
/// color per variant, and `match` keeps that assignment exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum Counter {
    /// Memory currently allocated to the process.
    Allocated,

    /// Memory reserved from the OS (address space), a superset of allocated.
    Reserved,

    /// Live bytes on the managed/runtime heap.
    ManagedHeap,

    /// Whole-system used memory. Reads as zero where the host cannot provide
    /// it; consumers treat zero as "unavailable" rather than a real value.
    SystemUsed,
}

/// A full set of counter readings taken at one instant, in megabytes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CounterReadings {
    pub allocated_mb: f64,
    pub reserved_mb: f64,
    pub managed_mb: f64,
    pub system_mb: f64,
}

impl CounterReadings {
    #[must_use]
    pub fn get(&self, counter: Counter) -> f64 {
        match counter {
            Counter::Allocated => self.allocated_mb,
            Counter::Reserved => self.reserved_mb,
            Counter::ManagedHeap => self.managed_mb,
            Counter::SystemUsed => self.system_mb,
        }
    }

    pub fn set(&mut self, counter: Counter, value: f64) {
        match counter {
            Counter::Allocated => self.allocated_mb = value,
            Counter::Reserved => self.reserved_mb = value,
            Counter::ManagedHeap => self.managed_mb = value,
            Counter::SystemUsed => self.system_mb = value,
        }
    }

    /// Largest reading across all four counters.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.allocated_mb
            .max(self.reserved_mb)
            .max(self.managed_mb)
            .max(self.system_mb)
    }
}

#[inline]
#[must_use]
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}
