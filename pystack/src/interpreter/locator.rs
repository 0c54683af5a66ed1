//! Thread-state locator
//!
//! Resolves the address of the interpreter's current-thread execution-state
//! record: find the mapped image, select the version's offset table, resolve
//! the exported thread-state symbol in the image file, rebase it for
//! position-independent images, and follow the pointer indirection to the
//! live record. Everything here except the final remote read is fatal on
//! failure; no stack can be produced without a trustworthy address.

use std::fs;

use log::{debug, warn};
use object::{Object, ObjectKind, ObjectSymbol};

use crate::domain::{Pid, RemoteAddress, TraceError};
use crate::tracer::MemoryReader;

use super::layout::{layout_for, PyLayout, ThreadStateAccess};
use super::maps::{find_interpreter_image, InterpreterImage};
use super::version::PyVersion;

/// Everything the frame walker needs about the located interpreter.
#[derive(Debug, Clone, Copy)]
pub struct InterpreterInfo {
    pub version: PyVersion,
    pub layout: PyLayout,
    /// Address of the current-thread execution-state record. Null when the
    /// interpreter held no thread state at locate time; captures then fail
    /// recoverably until one appears.
    pub thread_state: RemoteAddress,
}

/// Locate the current-thread execution-state record in process `pid`.
///
/// # Errors
/// Fatal: no interpreter image, unsupported version, unreadable or
/// symbol-less image. Recoverable: the single remote read of the pointer
/// cell failing.
pub fn locate(pid: Pid, reader: &impl MemoryReader) -> Result<InterpreterInfo, TraceError> {
    let image = find_interpreter_image(pid)?;
    let layout = layout_for(image.version)?;

    let symbol_addr = resolve_symbol(&image, layout.thread_state.symbol())?;
    let cell = match layout.thread_state {
        ThreadStateAccess::CurrentSymbol => symbol_addr,
        ThreadStateAccess::RuntimeOffset(offset) => symbol_addr.offset(offset),
    };

    let thread_state = reader.read_ptr(cell)?;
    if thread_state.is_null() {
        warn!("python {} in process {pid} has no active thread state", image.version);
    } else {
        debug!("python {} thread state record at {thread_state}", image.version);
    }

    Ok(InterpreterInfo { version: image.version, layout, thread_state })
}

/// Resolve an exported symbol's runtime address in the tracee.
///
/// The image file is parsed locally; for position-independent images
/// (shared libpython, PIE executables) the symbol's file virtual address is
/// rebased onto the mapped base.
fn resolve_symbol(image: &InterpreterImage, symbol: &'static str) -> Result<RemoteAddress, TraceError> {
    let data = fs::read(&image.path)?;
    let obj = object::File::parse(&*data).map_err(|err| TraceError::ImageParse {
        image: image.path.display().to_string(),
        reason: err.to_string(),
    })?;

    let sym = obj
        .dynamic_symbols()
        .chain(obj.symbols())
        .find(|sym| sym.name().map_or(false, |name| name == symbol))
        .ok_or_else(|| TraceError::SymbolNotFound {
            symbol,
            image: image.path.display().to_string(),
        })?;

    let addr = match obj.kind() {
        ObjectKind::Dynamic => image.base.offset(sym.address()),
        _ => RemoteAddress(sym.address()),
    };
    debug!("{symbol} resolved to {addr}");
    Ok(addr)
}
