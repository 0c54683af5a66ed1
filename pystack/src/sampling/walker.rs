//! Frame chain walker
//!
//! Reconstructs the call stack by following the linked frame records out of
//! the thread-state record. Remote memory is treated as adversarial input:
//! the walk is depth-bounded, string reads are length-capped, and every
//! pointer is null-checked before it is followed. All failures here are
//! recoverable; they cost one capture attempt, never the run.

use crate::domain::{Frame, RemoteAddress, Stack, TraceError};
use crate::interpreter::PyLayout;
use crate::tracer::MemoryReader;

/// Upper bound on walked frames; a longer chain is assumed corrupt or
/// cyclic.
pub const MAX_FRAME_DEPTH: usize = 128;

/// Longest string pulled out of the tracee, in bytes.
const MAX_STR_LEN: u64 = 4096;

/// Capture the call stack reachable from `thread_state`.
///
/// Frames are appended innermost first; the walk stops at the null terminal
/// pointer of the chain.
///
/// # Errors
/// Always recoverable: a null or stale thread state, a read failure partway
/// through the chain (the target mutated it or exited), a chain deeper than
/// [`MAX_FRAME_DEPTH`], or a walk yielding zero frames.
pub fn capture(
    reader: &impl MemoryReader,
    layout: &PyLayout,
    thread_state: RemoteAddress,
) -> Result<Stack, TraceError> {
    if thread_state.is_null() {
        return Err(TraceError::NoThreadState);
    }

    let mut frame_addr = reader.read_ptr(thread_state.offset(layout.tstate_frame))?;
    let mut frames = Vec::new();
    while !frame_addr.is_null() {
        if frames.len() == MAX_FRAME_DEPTH {
            return Err(TraceError::FrameChainTooDeep(MAX_FRAME_DEPTH));
        }
        frames.push(read_frame(reader, layout, frame_addr)?);
        frame_addr = reader.read_ptr(frame_addr.offset(layout.frame_back))?;
    }

    if frames.is_empty() {
        return Err(TraceError::EmptyStack);
    }
    Ok(Stack::new(frames))
}

fn read_frame(
    reader: &impl MemoryReader,
    layout: &PyLayout,
    frame: RemoteAddress,
) -> Result<Frame, TraceError> {
    let code = reader.read_ptr(frame.offset(layout.frame_code))?;
    if code.is_null() {
        return Err(TraceError::CorruptFrame(frame));
    }

    let filename_addr = reader.read_ptr(code.offset(layout.code_filename))?;
    let name_addr = reader.read_ptr(code.offset(layout.code_name))?;
    if filename_addr.is_null() {
        return Err(TraceError::CorruptFrame(frame));
    }

    let file = read_str(reader, layout, filename_addr)?;
    let name = if name_addr.is_null() {
        None
    } else {
        Some(read_str(reader, layout, name_addr)?)
    };
    let line = reader.read_i32(frame.offset(layout.frame_lineno))?;

    Ok(Frame { file, name, line: u32::try_from(line).ok() })
}

fn read_str(
    reader: &impl MemoryReader,
    layout: &PyLayout,
    addr: RemoteAddress,
) -> Result<String, TraceError> {
    let len = reader.read_u64(addr.offset(layout.str_len))?.min(MAX_STR_LEN);
    #[allow(clippy::cast_possible_truncation)]
    let bytes = reader.read_bytes(addr.offset(layout.str_data), len as usize)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
