//! Sampling pipeline
//!
//! - `walker`: reconstruct one call stack from remote memory
//! - `sampler`: the timed capture/release loop
//! - `aggregator`: deduplicate stacks into occurrence counts
//! - `target`: the live-process implementation of the sampling seam

pub mod aggregator;
pub mod sampler;
pub mod target;
pub mod walker;

pub use aggregator::SampleSet;
pub use sampler::{SampleSource, Sampler};
pub use target::RemotePython;
pub use walker::{capture, MAX_FRAME_DEPTH};
