// cancel.rs - Cooperative cancellation for long-running loops

use crate::error::{BioenvError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag checked between units of work. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Fail with `Cancelled` once the flag is set
    pub fn check(&self, completed: usize, total: usize) -> Result<()> {
        if self.is_cancelled() {
            Err(BioenvError::Cancelled { completed, total })
        } else {
            Ok(())
        }
    }
}
