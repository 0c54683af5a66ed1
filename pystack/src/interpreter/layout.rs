//! Version-keyed interpreter struct layouts
//!
//! Field offsets into the interpreter's internal structures for 64-bit
//! Linux builds, taken from the CPython headers of each release line.
//! Remote reads are only trusted after the version check selects one of
//! these tables; an unknown version fails fatally rather than guessing,
//! since a wrong offset reads unrelated memory and reconstructs a bogus
//! stack.

use crate::domain::TraceError;

use super::version::PyVersion;

/// How the runtime publishes the current thread state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadStateAccess {
    /// `_PyThreadState_Current` is a pointer cell holding the live record
    /// (CPython 2.7 through 3.6).
    CurrentSymbol,
    /// `_PyRuntime` embeds the pointer cell at a fixed offset
    /// (`gilstate.tstate_current`, CPython 3.7 through 3.10).
    RuntimeOffset(u64),
}

impl ThreadStateAccess {
    /// The exported symbol the locator resolves in the interpreter image.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::CurrentSymbol => "_PyThreadState_Current",
            Self::RuntimeOffset(_) => "_PyRuntime",
        }
    }
}

/// Field offsets for one CPython version.
#[derive(Debug, Clone, Copy)]
pub struct PyLayout {
    pub thread_state: ThreadStateAccess,
    /// `PyThreadState.frame`
    pub tstate_frame: u64,
    /// `PyFrameObject.f_back`
    pub frame_back: u64,
    /// `PyFrameObject.f_code`
    pub frame_code: u64,
    /// `PyFrameObject.f_lineno`
    pub frame_lineno: u64,
    /// `PyCodeObject.co_filename`
    pub code_filename: u64,
    /// `PyCodeObject.co_name`
    pub code_name: u64,
    /// String object: length field
    pub str_len: u64,
    /// String object: first inline byte (`ob_sval` for 2.x bytes,
    /// end of the `PyASCIIObject` header for 3.x compact unicode)
    pub str_data: u64,
}

/// Select the offset table for a detected interpreter version.
///
/// # Errors
/// [`TraceError::UnsupportedInterpreter`] for versions without a table.
/// 3.11 changed the frame representation entirely and is rejected rather
/// than misread.
pub fn layout_for(version: PyVersion) -> Result<PyLayout, TraceError> {
    let layout = match (version.major, version.minor) {
        (2, 7) => PyLayout {
            thread_state: ThreadStateAccess::CurrentSymbol,
            tstate_frame: 16,
            frame_back: 24,
            frame_code: 32,
            frame_lineno: 124,
            code_filename: 80,
            code_name: 88,
            str_len: 16,
            str_data: 36,
        },
        (3, 4..=6) => PyLayout {
            thread_state: ThreadStateAccess::CurrentSymbol,
            tstate_frame: 24,
            frame_back: 24,
            frame_code: 32,
            frame_lineno: 124,
            code_filename: 96,
            code_name: 104,
            str_len: 16,
            str_data: 48,
        },
        (3, 7) => PyLayout {
            thread_state: ThreadStateAccess::RuntimeOffset(1392),
            tstate_frame: 24,
            frame_back: 24,
            frame_code: 32,
            frame_lineno: 108,
            code_filename: 96,
            code_name: 104,
            str_len: 16,
            str_data: 48,
        },
        (3, 8) => PyLayout {
            thread_state: ThreadStateAccess::RuntimeOffset(1368),
            tstate_frame: 24,
            frame_back: 24,
            frame_code: 32,
            frame_lineno: 108,
            code_filename: 104,
            code_name: 112,
            str_len: 16,
            str_data: 48,
        },
        (3, 9) => PyLayout {
            thread_state: ThreadStateAccess::RuntimeOffset(568),
            tstate_frame: 24,
            frame_back: 24,
            frame_code: 32,
            frame_lineno: 108,
            code_filename: 104,
            code_name: 112,
            str_len: 16,
            str_data: 48,
        },
        (3, 10) => PyLayout {
            thread_state: ThreadStateAccess::RuntimeOffset(568),
            tstate_frame: 24,
            frame_back: 24,
            frame_code: 32,
            frame_lineno: 100,
            code_filename: 104,
            code_name: 112,
            str_len: 16,
            str_data: 48,
        },
        _ => return Err(TraceError::UnsupportedInterpreter(version.to_string())),
    };
    Ok(layout)
}
