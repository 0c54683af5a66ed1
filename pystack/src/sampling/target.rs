//! Live-process sample source
//!
//! Bridges the tracer session, the located interpreter, and the frame
//! walker into the [`SampleSource`] the sampling engine drives. Owns the
//! session for the duration of a sampling run; dropping it detaches.

use crate::domain::{RemoteAddress, Stack, TraceError};
use crate::interpreter::PyLayout;
use crate::tracer::{ProcessMemory, TracerSession};

use super::sampler::SampleSource;
use super::walker;

pub struct RemotePython {
    session: TracerSession,
    layout: PyLayout,
    thread_state: RemoteAddress,
}

impl RemotePython {
    #[must_use]
    pub fn new(session: TracerSession, layout: PyLayout, thread_state: RemoteAddress) -> Self {
        Self { session, layout, thread_state }
    }
}

impl SampleSource for RemotePython {
    fn capture(&mut self) -> Result<Stack, TraceError> {
        let reader = ProcessMemory::new(&self.session);
        walker::capture(&reader, &self.layout, self.thread_state)
    }

    fn release(&mut self) -> Result<(), TraceError> {
        self.session.detach()
    }

    fn suspend(&mut self) -> Result<(), TraceError> {
        self.session.reattach()
    }
}
