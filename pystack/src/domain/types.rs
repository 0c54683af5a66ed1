//! Core domain types
//!
//! Newtype wrappers keep tracee-side values (pids, remote addresses) from
//! mixing with local ones, and the `Frame`/`Stack` pair is the snapshot
//! model every other module consumes.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Process id of a tracee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pid(pub i32);

impl Pid {
    /// Largest pid representable on this platform.
    pub const MAX: i64 = libc::pid_t::MAX as i64;

    /// Validate a raw command-line value against the platform pid range.
    /// Returns `None` for zero, negative, and out-of-range values.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_arg(raw: i64) -> Option<Self> {
        if (1..=Self::MAX).contains(&raw) {
            Some(Self(raw as i32))
        } else {
            None
        }
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An address inside the tracee's address space.
///
/// Only meaningful to the remote memory accessor; never dereferenced
/// locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAddress(pub u64);

impl RemoteAddress {
    pub const NULL: Self = Self(0);

    #[must_use]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// The address `bytes` past this one.
    #[must_use]
    pub fn offset(self, bytes: u64) -> Self {
        Self(self.0.wrapping_add(bytes))
    }
}

impl fmt::Display for RemoteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// One interpreter activation record.
///
/// The source file is always captured; function name and line number are
/// filled in when the interpreter layout exposes them. Two frames are equal
/// only if every captured field matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub file: String,
    pub name: Option<String>,
    pub line: Option<u32>,
}

impl Frame {
    /// A frame identified by source file only (mock captures, py2 fallbacks).
    pub fn from_file(file: impl Into<String>) -> Self {
        Self { file: file.into(), name: None, line: None }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, self.line) {
            (Some(name), Some(line)) => write!(f, "{}:{name}:{line}", self.file),
            (Some(name), None) => write!(f, "{}:{name}", self.file),
            (None, _) => f.write_str(&self.file),
        }
    }
}

/// An ordered capture of one call chain.
///
/// Index 0 is the innermost (currently executing) frame, the last index the
/// outermost entry point. The walker never produces an empty stack; the
/// formatter re-checks that invariant before emitting report lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack(Vec<Frame>);

impl Stack {
    #[must_use]
    pub fn new(frames: Vec<Frame>) -> Self {
        Self(frames)
    }

    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.0
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Hashes position and source-file identity only. Function name and line are
/// deliberately left out, so stacks differing only in those fields collide;
/// bucket membership is decided by full `Eq`, never by hash alone.
impl Hash for Stack {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for (i, frame) in self.0.iter().enumerate() {
            i.hash(state);
            frame.file.hash(state);
        }
    }
}
