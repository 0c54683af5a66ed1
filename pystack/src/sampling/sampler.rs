//! Timed sampling engine
//!
//! Drives repeated captures over a configured window, alternating between a
//! suspended target (during a capture) and a free-running one (during the
//! sleep between samples). Overhead is therefore proportional to capture
//! time, not wall-clock duration.

use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::domain::{Stack, TraceError};

use super::aggregator::SampleSet;

/// One profilable target, suspended on entry to every capture.
///
/// The live implementation is [`super::RemotePython`]; tests script the
/// timing loop with canned captures.
pub trait SampleSource {
    /// Capture one stack. The target must currently be suspended.
    ///
    /// # Errors
    /// Recoverable errors cost this sample only; anything else aborts the
    /// run.
    fn capture(&mut self) -> Result<Stack, TraceError>;

    /// Let the target run (detach).
    ///
    /// # Errors
    /// [`TraceError::TargetExited`] when the target is already gone.
    fn release(&mut self) -> Result<(), TraceError>;

    /// Stop the target again before the next capture (reattach).
    ///
    /// # Errors
    /// [`TraceError::TargetExited`] when the target exited while running.
    fn suspend(&mut self) -> Result<(), TraceError>;
}

pub struct Sampler {
    interval: Duration,
    duration: Duration,
}

impl Sampler {
    #[must_use]
    pub fn new(interval: Duration, duration: Duration) -> Self {
        Self { interval, duration }
    }

    /// Sample `source` until the window closes and return the aggregate.
    ///
    /// The deadline is fixed at loop start; the loop exits as soon as the
    /// next sample would land past it (`now + interval >= end`), so the
    /// requested duration is a soft upper bound within one interval's
    /// slack, and at least one capture is always attempted.
    ///
    /// A target that exits mid-run ends the loop early; whatever was
    /// aggregated up to that point is still returned.
    ///
    /// # Errors
    /// Only non-recoverable capture or session errors; recoverable capture
    /// failures are absorbed into the null-sample counter.
    pub fn run(&self, source: &mut impl SampleSource) -> Result<SampleSet, TraceError> {
        let mut samples = SampleSet::new();
        let end = Instant::now() + self.duration;

        loop {
            match source.capture() {
                Ok(stack) => samples.record(stack),
                Err(err) if err.is_recoverable() => {
                    debug!("sample failed: {err}");
                    samples.record_null();
                }
                Err(err) => return Err(err),
            }

            if Instant::now() + self.interval >= end {
                break;
            }

            match self.let_target_run(source) {
                Ok(()) => {}
                Err(TraceError::TargetExited(pid)) => {
                    info!("process {pid} exited; stopping early");
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(samples)
    }

    fn let_target_run(&self, source: &mut impl SampleSource) -> Result<(), TraceError> {
        source.release()?;
        thread::sleep(self.interval);
        source.suspend()
    }
}
