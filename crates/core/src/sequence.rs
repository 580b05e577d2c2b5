//! Per-category sequence counters
//!
//! The gateway validates a strictly increasing sequence number per
//! category. Counters only move forward on acknowledged pushes, or jump
//! to whatever the gateway says it expects next.

use exrelay_domain::MetricCategory;
use parking_lot::RwLock;

/// Monotonic sequence counters, one independent cell per category.
///
/// A mutation on one category never blocks a read on another.
pub struct SequenceTracker {
    counters: [RwLock<u64>; 4],
}

impl SequenceTracker {
    /// All counters start at 1, the first number the gateway accepts.
    pub const fn new() -> Self {
        Self {
            counters: [RwLock::new(1), RwLock::new(1), RwLock::new(1), RwLock::new(1)],
        }
    }

    const fn cell(&self, category: MetricCategory) -> &RwLock<u64> {
        &self.counters[category as usize]
    }

    /// Sequence number the next envelope should carry. Read-only.
    pub fn next(&self, category: MetricCategory) -> u64 {
        *self.cell(category).read()
    }

    /// Advance after an acknowledged push.
    pub fn advance(&self, category: MetricCategory) {
        *self.cell(category).write() += 1;
    }

    /// Force-set the counter to the value the gateway expects.
    pub fn resync(&self, category: MetricCategory, expected: u64) {
        *self.cell(category).write() = expected;
    }
}

impl Default for SequenceTracker {
    fn default() -> Self {
        Self::new()
    }
}
