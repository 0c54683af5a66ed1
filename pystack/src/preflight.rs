//! Pre-attach checks for the target process
//!
//! Validates that the target exists and is inspectable before any ptrace
//! call, with actionable messages when it is not.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::domain::Pid;

/// Run all pre-attach checks.
///
/// # Errors
/// Any failed check; nothing has touched the target yet when these fire.
pub fn run_preflight_checks(pid: Pid) -> Result<()> {
    check_process_exists(pid)?;
    check_proc_access(pid)?;
    Ok(())
}

/// Check that the target process exists.
///
/// # Errors
/// The process is not running.
pub fn check_process_exists(pid: Pid) -> Result<()> {
    let proc_path = format!("/proc/{pid}");
    if !Path::new(&proc_path).exists() {
        bail!(
            "Process {pid} not found.\n\n\
             Is the process still running? Check with: ps -p {pid}"
        );
    }
    Ok(())
}

/// Check that the process's memory maps are readable.
///
/// # Errors
/// The maps file is unreadable, which also means ptrace would be refused.
pub fn check_proc_access(pid: Pid) -> Result<()> {
    let maps_path = format!("/proc/{pid}/maps");
    std::fs::read_to_string(&maps_path).with_context(|| {
        format!(
            "Cannot read {maps_path}\n\n\
             This usually means:\n\
             - The process doesn't exist (check: ps -p {pid})\n\
             - Permission denied (run with sudo)\n\
             - /proc is not mounted"
        )
    })?;
    Ok(())
}
