//! CLI argument definitions

use anyhow::{bail, Result};
use clap::Parser;
use std::time::Duration;

use crate::domain::Pid;

#[derive(Parser, Debug)]
#[command(
    name = "pystack",
    version,
    disable_version_flag = true,
    about = "Dump or sample the Python call stack of a running process",
    after_help = "\
EXAMPLES:
    sudo pystack 1234                 Print the current stack once
    sudo pystack -s 5 1234            Sample for 5 seconds, print folded stacks
    sudo pystack -s 5 -r 0.001 1234   Sample every millisecond"
)]
pub struct Args {
    /// Process ID of the target Python interpreter
    #[arg(value_name = "PID")]
    pub pid: i64,

    /// Seconds between samples in sampling mode
    #[arg(short, long, value_name = "SECONDS", default_value_t = 0.01)]
    pub rate: f64,

    /// Total sampling duration in seconds (0 = print one stack and exit)
    #[arg(short, long, value_name = "SECONDS", default_value_t = 0.0)]
    pub seconds: f64,

    /// Print version
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    pub version: Option<bool>,
}

impl Args {
    /// Validate the positional PID against the platform pid range.
    ///
    /// # Errors
    /// Out-of-range values are usage errors, rejected before any attach
    /// attempt.
    pub fn validated_pid(&self) -> Result<Pid> {
        Pid::from_arg(self.pid)
            .ok_or_else(|| anyhow::anyhow!("PID {} is out of the valid pid range", self.pid))
    }

    /// Validate the timing options and derive the sampling interval.
    ///
    /// # Errors
    /// Non-positive rates and negative durations are usage errors.
    pub fn validated_timing(&self) -> Result<(Duration, Duration)> {
        if !self.rate.is_finite() || self.rate <= 0.0 {
            bail!("--rate must be a positive number of seconds, got {}", self.rate);
        }
        if !self.seconds.is_finite() || self.seconds < 0.0 {
            bail!("--seconds must be non-negative, got {}", self.seconds);
        }
        Ok((Duration::from_secs_f64(self.rate), Duration::from_secs_f64(self.seconds)))
    }

    /// Sampling mode is requested by any nonzero duration.
    #[must_use]
    pub fn sampling(&self) -> bool {
        self.seconds > 0.0
    }
}
