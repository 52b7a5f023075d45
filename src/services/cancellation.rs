use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelledError {
    #[error("forecast cancelled: deadline exceeded")]
    DeadlineExceeded,
    #[error("forecast cancelled by caller")]
    Requested,
}

/// Batch-level cancellation handle shared by all simulation workers.
///
/// Clones share the same flag, so a caller can keep one clone and cancel a
/// forecast running on other threads.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => Self::new(),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn check(&self) -> Result<(), CancelledError> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Err(CancelledError::Requested);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(CancelledError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}
