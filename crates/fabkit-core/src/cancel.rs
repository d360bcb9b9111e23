//! Cooperative cancellation latches.
//!
//! Every export job owns two independent one-shot latches:
//!
//! - the **soft** token, checked by drivers before each stage;
//! - the **hard** token, threaded into long-running engine calls so they
//!   can return from deep inside their own loops.
//!
//! A user cancel sets both. Once set, a latch is never reset.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{GeometryError, GeometryResult};

/// A one-way boolean latch shared between threads
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create an unset token
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the latch. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether the latch has been set
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Return `Err(GeometryError::Interrupted)` once the latch is set
    ///
    /// Intended for inner loops: `token.check()?;`
    pub fn check(&self) -> GeometryResult<()> {
        if self.is_cancelled() {
            Err(GeometryError::Interrupted)
        } else {
            Ok(())
        }
    }
}

/// The soft/hard token pair owned by one export job
#[derive(Debug, Clone, Default)]
pub struct CancelTokens {
    soft: CancellationToken,
    hard: CancellationToken,
}

impl CancelTokens {
    /// Create a fresh, unset pair
    pub fn new() -> Self {
        Self::default()
    }

    /// Token observed at stage boundaries
    pub fn soft(&self) -> &CancellationToken {
        &self.soft
    }

    /// Token passed into engine computations
    pub fn hard(&self) -> &CancellationToken {
        &self.hard
    }

    /// Set both latches. Returns immediately and may be called repeatedly.
    pub fn cancel(&self) {
        self.soft.cancel();
        self.hard.cancel();
    }

    /// True if either latch is set
    pub fn is_cancelled(&self) -> bool {
        self.soft.is_cancelled() || self.hard.is_cancelled()
    }
}
