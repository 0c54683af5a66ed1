//! ptrace attach/detach lifecycle
//!
//! A [`TracerSession`] is the exclusive tracing attachment to one process.
//! While attached the target is stopped; remote reads are only legal for the
//! lifetime of an attached session. Every exit path detaches: explicitly via
//! [`TracerSession::detach`], or best-effort on drop, so an error partway
//! through a capture never leaves the target frozen.
//!
//! All calls must happen on the thread that attached; the kernel binds
//! tracing control to the attaching thread.

use log::{debug, warn};
use nix::sys::ptrace;
use nix::sys::wait::{waitpid, WaitStatus};

use super::nix_pid;
use crate::domain::{Pid, TraceError};

#[derive(Debug)]
pub struct TracerSession {
    pid: Pid,
    attached: bool,
}

impl TracerSession {
    /// Attach to `pid` and wait for the target to stop.
    ///
    /// # Errors
    /// Fails with a fatal [`TraceError::AttachFailed`] when the process does
    /// not exist, access is denied, or the process is already traced.
    pub fn attach(pid: Pid) -> Result<Self, TraceError> {
        ptrace::attach(nix_pid(pid)).map_err(|source| TraceError::AttachFailed { pid, source })?;
        let mut session = Self { pid, attached: true };
        session.wait_for_stop()?;
        debug!("attached to process {pid}");
        Ok(session)
    }

    #[must_use]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Release tracing control and let the target run.
    ///
    /// Safe to call on an already-detached session.
    ///
    /// # Errors
    /// A target that has already exited yields a recoverable
    /// [`TraceError::TargetExited`], never a crash.
    pub fn detach(&mut self) -> Result<(), TraceError> {
        if !self.attached {
            return Ok(());
        }
        self.attached = false;
        match ptrace::detach(nix_pid(self.pid), None) {
            Ok(()) => {
                debug!("detached from process {}", self.pid);
                Ok(())
            }
            Err(nix::Error::ESRCH) => Err(TraceError::TargetExited(self.pid)),
            Err(source) => Err(TraceError::DetachFailed { pid: self.pid, source }),
        }
    }

    /// Stop the target again after a [`detach`](Self::detach).
    ///
    /// # Errors
    /// Unlike the initial attach, a target that exited between samples is a
    /// recoverable [`TraceError::TargetExited`].
    pub fn reattach(&mut self) -> Result<(), TraceError> {
        if self.attached {
            return Ok(());
        }
        match ptrace::attach(nix_pid(self.pid)) {
            Ok(()) => {}
            Err(nix::Error::ESRCH) => return Err(TraceError::TargetExited(self.pid)),
            Err(source) => return Err(TraceError::AttachFailed { pid: self.pid, source }),
        }
        self.attached = true;
        self.wait_for_stop()
    }

    fn wait_for_stop(&mut self) -> Result<(), TraceError> {
        match waitpid(nix_pid(self.pid), None) {
            Ok(WaitStatus::Stopped(_, _)) => Ok(()),
            Ok(status) => {
                // The target delivered an exit instead of the attach stop.
                warn!("unexpected wait status for process {}: {status:?}", self.pid);
                self.attached = false;
                Err(TraceError::TargetExited(self.pid))
            }
            Err(nix::Error::ECHILD | nix::Error::ESRCH) => {
                self.attached = false;
                Err(TraceError::TargetExited(self.pid))
            }
            Err(source) => {
                self.attached = false;
                Err(TraceError::AttachFailed { pid: self.pid, source })
            }
        }
    }
}

impl Drop for TracerSession {
    fn drop(&mut self) {
        if self.attached {
            // Best effort; the target may already be gone.
            let _ = ptrace::detach(nix_pid(self.pid), None);
        }
    }
}
