//! Remote memory access
//!
//! Every interpreter structure is pulled through the [`MemoryReader`] trait,
//! so faults surface at one boundary and tests can substitute scripted
//! memory for a live tracee. The production implementation reads through the
//! ptrace peek primitive, chunked to its word granularity.

use std::ffi::c_void;

use nix::sys::ptrace;

use super::nix_pid;
use super::session::TracerSession;
use crate::domain::{Pid, RemoteAddress, TraceError};

const WORD: usize = std::mem::size_of::<libc::c_long>();

/// Byte-level access to a (possibly remote) address space.
///
/// All reads treat the source as untrusted input: a failure is a
/// recoverable, per-address error and never corrupts the session.
pub trait MemoryReader {
    /// Read exactly `len` bytes starting at `addr`.
    ///
    /// # Errors
    /// [`TraceError::MemoryRead`] for unmapped or unreadable addresses.
    fn read_bytes(&self, addr: RemoteAddress, len: usize) -> Result<Vec<u8>, TraceError>;

    /// Read a native-endian pointer-sized word as a remote address.
    ///
    /// # Errors
    /// See [`MemoryReader::read_bytes`].
    fn read_ptr(&self, addr: RemoteAddress) -> Result<RemoteAddress, TraceError> {
        Ok(RemoteAddress(self.read_u64(addr)?))
    }

    /// # Errors
    /// See [`MemoryReader::read_bytes`].
    fn read_u64(&self, addr: RemoteAddress) -> Result<u64, TraceError> {
        let bytes = self.read_bytes(addr, 8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&bytes);
        Ok(u64::from_ne_bytes(buf))
    }

    /// # Errors
    /// See [`MemoryReader::read_bytes`].
    fn read_i32(&self, addr: RemoteAddress) -> Result<i32, TraceError> {
        let bytes = self.read_bytes(addr, 4)?;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&bytes);
        Ok(i32::from_ne_bytes(buf))
    }
}

/// Reads the tracee's memory one ptrace word at a time.
///
/// Borrows the session so reads cannot outlive the attachment that makes
/// them legal.
pub struct ProcessMemory<'a> {
    session: &'a TracerSession,
}

impl<'a> ProcessMemory<'a> {
    #[must_use]
    pub fn new(session: &'a TracerSession) -> Self {
        Self { session }
    }

    fn pid(&self) -> Pid {
        self.session.pid()
    }
}

impl MemoryReader for ProcessMemory<'_> {
    fn read_bytes(&self, addr: RemoteAddress, len: usize) -> Result<Vec<u8>, TraceError> {
        let mut out = Vec::with_capacity(len + WORD);
        while out.len() < len {
            let word_addr = addr.offset(out.len() as u64);
            #[allow(clippy::cast_possible_truncation)]
            let word = ptrace::read(nix_pid(self.pid()), word_addr.0 as *mut c_void).map_err(
                |source| TraceError::MemoryRead { pid: self.pid(), addr: word_addr, len, source },
            )?;
            out.extend_from_slice(&word.to_ne_bytes());
        }
        out.truncate(len);
        Ok(out)
    }
}
