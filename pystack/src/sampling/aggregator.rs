//! Stack aggregation
//!
//! Deduplicates captured stacks by structural identity and counts
//! occurrences. Failed captures are tracked in a separate null-sample
//! counter so the report can account for every attempt.

use std::collections::HashMap;

use crate::domain::Stack;

#[derive(Debug, Default)]
pub struct SampleSet {
    buckets: HashMap<Stack, u64>,
    null_samples: u64,
}

impl SampleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successful capture. Structurally equal stacks share a
    /// bucket; the map's equality check (full frame identity) is what
    /// merges, so hash collisions never conflate distinct stacks.
    pub fn record(&mut self, stack: Stack) {
        *self.buckets.entry(stack).or_insert(0) += 1;
    }

    /// Record one capture attempt that produced no stack.
    pub fn record_null(&mut self) {
        self.null_samples += 1;
    }

    #[must_use]
    pub fn null_samples(&self) -> u64 {
        self.null_samples
    }

    /// Number of distinct stacks observed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Stack, u64)> {
        self.buckets.iter().map(|(stack, count)| (stack, *count))
    }
}
