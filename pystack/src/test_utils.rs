//! Scripted in-memory stand-ins for the tracing seams, used by unit and
//! integration tests.

use std::collections::HashMap;

use crate::domain::{Pid, RemoteAddress, TraceError};
use crate::tracer::MemoryReader;

/// A fake address space backed by a byte map.
///
/// Reads touching any unmapped byte fail with the same recoverable error the
/// live accessor produces, which makes truncated-chain scenarios easy to
/// script: just leave the bytes out.
#[derive(Debug, Default)]
pub struct FakeMemory {
    bytes: HashMap<u64, u8>,
}

impl FakeMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_bytes(&mut self, addr: u64, bytes: &[u8]) {
        for (i, byte) in bytes.iter().enumerate() {
            self.bytes.insert(addr + i as u64, *byte);
        }
    }

    pub fn put_u64(&mut self, addr: u64, value: u64) {
        self.put_bytes(addr, &value.to_ne_bytes());
    }

    pub fn put_u32(&mut self, addr: u64, value: u32) {
        self.put_bytes(addr, &value.to_ne_bytes());
    }

    pub fn forget(&mut self, addr: u64, len: usize) {
        for i in 0..len {
            self.bytes.remove(&(addr + i as u64));
        }
    }
}

impl MemoryReader for FakeMemory {
    fn read_bytes(&self, addr: RemoteAddress, len: usize) -> Result<Vec<u8>, TraceError> {
        (0..len as u64)
            .map(|i| {
                self.bytes.get(&(addr.0 + i)).copied().ok_or(TraceError::MemoryRead {
                    pid: Pid(0),
                    addr: RemoteAddress(addr.0 + i),
                    len,
                    source: nix::Error::EFAULT,
                })
            })
            .collect()
    }
}
