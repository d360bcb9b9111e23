//! Progress channel for export jobs.
//!
//! A single-value cell written by the worker and read by any number of
//! observers. Values only move forward; a write lower than the current
//! value is ignored, so readers see a non-decreasing sequence. Once closed
//! the cell keeps its last value and ignores further writes.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Highest percentage a channel can hold
pub const PROGRESS_COMPLETE: u8 = 100;

#[derive(Debug, Default)]
struct ProgressCell {
    percent: AtomicU8,
    closed: AtomicBool,
}

/// Shared handle to a job's progress cell
///
/// Cloning yields another handle to the same cell. Writes never block.
#[derive(Debug, Clone, Default)]
pub struct ProgressChannel {
    cell: Arc<ProgressCell>,
}

impl ProgressChannel {
    /// Create an open channel at 0%
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new percentage
    ///
    /// Values above 100 are clamped. Returns the new value if the cell
    /// advanced, `None` if the write was stale or the channel is closed.
    pub fn report(&self, percent: u8) -> Option<u8> {
        if self.is_closed() {
            return None;
        }
        let percent = percent.min(PROGRESS_COMPLETE);
        let previous = self.cell.percent.fetch_max(percent, Ordering::AcqRel);
        (percent > previous).then_some(percent)
    }

    /// Latest recorded percentage
    pub fn percent(&self) -> u8 {
        self.cell.percent.load(Ordering::Acquire)
    }

    /// Mark the channel closed. Reads still return the last value.
    pub fn close(&self) {
        self.cell.closed.store(true, Ordering::Release);
    }

    /// Whether the worker has torn the channel down
    pub fn is_closed(&self) -> bool {
        self.cell.closed.load(Ordering::Acquire)
    }
}
