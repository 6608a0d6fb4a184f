use memrun_metrics::CounterReadings;

/// A transient failure reading the counter source.
///
/// The sampling task skips the affected tick and keeps scheduling; partial
/// data beats an aborted benchmark pass, so this never escalates to the run.
#[derive(Debug, thiserror::Error)]
#[error("counter read failed: {0}")]
pub struct ReadError(pub String);

/// On-demand memory counter readings for one run.
///
/// `start` prepares the underlying counters and is idempotent. Teardown is
/// `Drop`: the sampling task owns the source for the run's duration and
/// disposes it when sampling stops. `read` must not block for more than a
/// negligible duration and reports best-effort zeros for counters the host
/// cannot provide.
pub trait CounterSource: Send {
    fn start(&mut self);

    fn read(&mut self) -> Result<CounterReadings, ReadError>;
}
