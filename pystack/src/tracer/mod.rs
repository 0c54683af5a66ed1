//! Process tracing primitives
//!
//! - `session`: ptrace attach/detach lifecycle for the tracee
//! - `memory`: byte-level reads of the tracee's address space

pub mod memory;
pub mod session;

pub use memory::{MemoryReader, ProcessMemory};
pub use session::TracerSession;

use crate::domain::Pid;

pub(crate) fn nix_pid(pid: Pid) -> nix::unistd::Pid {
    nix::unistd::Pid::from_raw(pid.0)
}
