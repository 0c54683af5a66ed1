//! # pystack - Python stack traces for running processes
//!
//! pystack inspects a running CPython process without its cooperation: it
//! attaches with ptrace, reads the interpreter's internal structures out of
//! the tracee's memory, and reconstructs the Python call stack. It serves
//! two modes:
//!
//! 1. **Single-shot** (default): print the current stack once, root first.
//! 2. **Sampling** (`--seconds N`): capture repeatedly over a window and
//!    print a folded/collapsed-stack report (`root;...;leaf count`) for
//!    flame-graph tooling.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   Tracer    │──▶│ Interpreter  │──▶│    Frame     │
//! │  (ptrace)   │   │   Locator    │   │    Walker    │
//! └─────────────┘   └──────────────┘   └──────┬───────┘
//!                                             │ stacks
//!                   ┌──────────────┐   ┌──────▼───────┐
//!                   │    Report    │◀──│   Sampler /  │
//!                   │  (folded)    │   │  Aggregator  │
//!                   └──────────────┘   └──────────────┘
//! ```
//!
//! - [`tracer`]: attach/detach lifecycle and word-chunked remote reads.
//!   While attached the target is stopped; the sampler detaches between
//!   captures so the target runs normally for most of the window.
//! - [`interpreter`]: finds the mapped python image, detects its version,
//!   and resolves the current-thread execution-state record through the
//!   image's exported symbols and a version-keyed offset table.
//! - [`sampling`]: walks the linked frame records into a [`domain::Stack`],
//!   drives the timed capture loop, and deduplicates identical stacks.
//! - [`report`]: renders the single-shot listing or the folded aggregate.
//!
//! Remote memory is treated as untrusted input throughout: reads are
//! fallible at one boundary, chain walks are depth-bounded, and struct
//! offsets are only trusted after version detection.

pub mod cli;
pub mod domain;
pub mod interpreter;
pub mod preflight;
pub mod report;
pub mod sampling;
pub mod test_utils;
pub mod tracer;
