//! Cancellation of long extraction batches
//!
//! Clones share one flag. Workers poll it at comment boundaries, so a
//! comment already being split finishes before the batch stops.

use super::extractor::ExtractError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop flag for sequential and parallel batches.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    stop: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder of this token to stop. Idempotent.
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// `Err(Cancelled { processed })` once the token has been tripped.
    pub(crate) fn ensure_active(&self, processed: usize) -> Result<(), ExtractError> {
        if self.is_cancelled() {
            Err(ExtractError::Cancelled { processed })
        } else {
            Ok(())
        }
    }
}
