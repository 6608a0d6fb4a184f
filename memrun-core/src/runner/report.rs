use std::io::{self, Write};

use memrun_metrics::{CounterReadings, Sample};

pub const CSV_HEADER: &str = "runId,target,iteration,timestampMs,phase,loadMs,allocatedMB,reservedMB,managedMB,systemUsedMB,peakAllocatedMB,peakReservedMB,peakManagedMB";

/// Append-only CSV metrics log.
///
/// The column order, phase tags, numeric formatting and per-phase field
/// shapes are a wire format: downstream tooling parses the rows as-is, so
/// they are emitted byte-for-byte in the historical shape: truncated
/// integer timestamps, one-decimal load durations, two-decimal counters,
/// three peak columns, and the uneven trailing-comma runs per phase.
#[derive(Debug)]
pub struct MetricsCsv<W: Write> {
    out: W,
}

impl<W: Write> MetricsCsv<W> {
    pub fn new(mut out: W) -> io::Result<Self> {
        writeln!(out, "{CSV_HEADER}")?;
        Ok(Self { out })
    }

    /// Threshold-crossing row. An unobserved crossing is written as `-1.0`.
    pub fn load90(
        &mut self,
        run_id: &str,
        target: &str,
        iteration: u32,
        timestamp_ms: f64,
        load_threshold_ms: Option<f64>,
    ) -> io::Result<()> {
        writeln!(
            self.out,
            "{run_id},{target},{iteration},{},Load90,{:.1},,,,,,",
            timestamp_ms as i64,
            load_threshold_ms.unwrap_or(-1.0),
        )
    }

    pub fn load_done(
        &mut self,
        run_id: &str,
        target: &str,
        iteration: u32,
        timestamp_ms: f64,
        load_complete_ms: f64,
        peaks: &CounterReadings,
    ) -> io::Result<()> {
        writeln!(
            self.out,
            "{run_id},{target},{iteration},{},LoadDone,{load_complete_ms:.1},,,,,,{:.2},{:.2},{:.2}",
            timestamp_ms as i64,
            peaks.allocated_mb,
            peaks.reserved_mb,
            peaks.managed_mb,
        )
    }

    pub fn post_activate(
        &mut self,
        run_id: &str,
        target: &str,
        iteration: u32,
        timestamp_ms: f64,
        steady: &CounterReadings,
        peaks: &CounterReadings,
    ) -> io::Result<()> {
        writeln!(
            self.out,
            "{run_id},{target},{iteration},{},PostActivate,,{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
            timestamp_ms as i64,
            steady.allocated_mb,
            steady.reserved_mb,
            steady.managed_mb,
            steady.system_mb,
            peaks.allocated_mb,
            peaks.reserved_mb,
            peaks.managed_mb,
        )
    }

    pub fn sample(
        &mut self,
        run_id: &str,
        target: &str,
        iteration: u32,
        sample: &Sample,
    ) -> io::Result<()> {
        writeln!(
            self.out,
            "{run_id},{target},{iteration},{},Sample,,{:.2},{:.2},{:.2},{:.2},,,",
            sample.time_ms as i64,
            sample.counters.allocated_mb,
            sample.counters.reserved_mb,
            sample.counters.managed_mb,
            sample.counters.system_mb,
        )
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
