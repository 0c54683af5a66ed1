//! Structured error types for pystack
//!
//! One enum covers the whole capture pipeline. The boundary in `main`
//! distinguishes two severities via [`TraceError::is_recoverable`]: fatal
//! errors abort the run with exit code 1, recoverable ones cost at most a
//! single sample (sampling mode) or end the run benignly (single-shot).

use super::types::{Pid, RemoteAddress};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("failed to attach to process {pid}: {source}")]
    AttachFailed { pid: Pid, source: nix::Error },

    #[error("failed to detach from process {pid}: {source}")]
    DetachFailed { pid: Pid, source: nix::Error },

    #[error("process {0} exited")]
    TargetExited(Pid),

    #[error("failed to read {len} bytes at {addr} in process {pid}: {source}")]
    MemoryRead { pid: Pid, addr: RemoteAddress, len: usize, source: nix::Error },

    #[error("no Python interpreter image mapped in process {0}")]
    InterpreterNotFound(Pid),

    #[error("unsupported Python interpreter: {0}")]
    UnsupportedInterpreter(String),

    #[error("failed to parse interpreter image {image}: {reason}")]
    ImageParse { image: String, reason: String },

    #[error("symbol {symbol} not found in {image}")]
    SymbolNotFound { symbol: &'static str, image: String },

    #[error("interpreter has no active thread state")]
    NoThreadState,

    #[error("frame at {0} has no code object")]
    CorruptFrame(RemoteAddress),

    #[error("frame chain exceeded {0} frames; assuming a corrupt or cyclic chain")]
    FrameChainTooDeep(usize),

    #[error("capture produced an empty stack")]
    EmptyStack,

    #[error("aggregated a stack with zero frames")]
    CorruptSample,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TraceError {
    /// Whether this error costs only the current capture attempt.
    ///
    /// Recoverable failures leave the session usable: the sampling loop
    /// counts them as null samples and continues, and single-shot mode
    /// reports them without treating the target's own termination as a
    /// failure of this tool.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TargetExited(_)
                | Self::MemoryRead { .. }
                | Self::NoThreadState
                | Self::CorruptFrame(_)
                | Self::FrameChainTooDeep(_)
                | Self::EmptyStack
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TraceError::SymbolNotFound {
            symbol: "_PyThreadState_Current",
            image: "/usr/lib/libpython2.7.so.1.0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "symbol _PyThreadState_Current not found in /usr/lib/libpython2.7.so.1.0"
        );

        let err = TraceError::MemoryRead {
            pid: Pid(42),
            addr: RemoteAddress(0xdead),
            len: 8,
            source: nix::Error::EFAULT,
        };
        assert!(err.to_string().contains("0xdead"));
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_severity_classification() {
        let recoverable = [
            TraceError::TargetExited(Pid(1)),
            TraceError::MemoryRead {
                pid: Pid(1),
                addr: RemoteAddress::NULL,
                len: 8,
                source: nix::Error::EFAULT,
            },
            TraceError::NoThreadState,
            TraceError::CorruptFrame(RemoteAddress(0x10)),
            TraceError::FrameChainTooDeep(128),
            TraceError::EmptyStack,
        ];
        for err in recoverable {
            assert!(err.is_recoverable(), "{err} should be recoverable");
        }

        let fatal = [
            TraceError::AttachFailed { pid: Pid(1), source: nix::Error::EPERM },
            TraceError::InterpreterNotFound(Pid(1)),
            TraceError::UnsupportedInterpreter("3.11".to_string()),
            TraceError::CorruptSample,
        ];
        for err in fatal {
            assert!(!err.is_recoverable(), "{err} should be fatal");
        }
    }
}
