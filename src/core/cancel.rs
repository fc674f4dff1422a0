use crate::utils::error::OracleError;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A point where long-running arithmetic may stop early.
pub trait Checkpoint {
    type Error;

    fn poll(&self) -> Result<(), Self::Error>;
}

/// Checkpoint that never interrupts; used by the plain `classify` path.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uninterruptible;

impl Checkpoint for Uninterruptible {
    type Error = Infallible;

    fn poll(&self) -> Result<(), Infallible> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Cancels the token when the returned guard is dropped, unless disarmed first.
    pub fn drop_guard(&self) -> CancelOnDrop {
        CancelOnDrop {
            token: Some(self.clone()),
        }
    }
}

impl Checkpoint for CancellationToken {
    type Error = OracleError;

    fn poll(&self) -> Result<(), OracleError> {
        if self.is_cancelled() {
            return Err(OracleError::Cancelled);
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct CancelOnDrop {
    token: Option<CancellationToken>,
}

impl CancelOnDrop {
    pub fn disarm(mut self) {
        self.token = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }
}
