//! Domain model for pystack
//!
//! Core types shared across the capture pipeline:
//! - Newtypes for process ids and tracee addresses
//! - The frame/stack snapshot model
//! - Structured error handling

pub mod errors;
pub mod types;

pub use types::{Frame, Pid, RemoteAddress, Stack};

pub use errors::TraceError;
