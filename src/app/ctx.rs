use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app::AppError;

/// Cancellation and deadline token threaded through every store call.
///
/// Clones share the cancel flag, so canceling any handle aborts the
/// whole call chain at its next store operation.
#[derive(Clone)]
pub struct Ctx {
    deadline: Option<Instant>,
    canceled: Arc<AtomicBool>,
}

impl Ctx {
    /// A context that never expires. Used by code with no caller deadline.
    pub fn background() -> Ctx {
        Ctx {
            deadline: None,
            canceled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Ctx {
        Ctx {
            deadline: Some(Instant::now() + timeout),
            canceled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        if self.canceled.load(Ordering::SeqCst) {
            return true;
        }
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// Fails with `AppError::Canceled` once the deadline passed or
    /// `cancel` was called.
    pub fn check(&self) -> Result<(), AppError> {
        if self.is_canceled() {
            return Err(AppError::Canceled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_passes_check() {
        let ctx = Ctx::background();
        assert!(ctx.check().is_ok());
        assert!(!ctx.is_canceled());
    }

    #[test]
    fn canceled_context_fails_check() {
        let ctx = Ctx::background();
        ctx.cancel();
        assert!(matches!(ctx.check(), Err(AppError::Canceled)));
    }

    #[test]
    fn cancel_propagates_to_clones() {
        let ctx = Ctx::background();
        let clone = ctx.clone();
        ctx.cancel();
        assert!(clone.is_canceled());
    }

    #[test]
    fn expired_deadline_fails_check() {
        let ctx = Ctx::with_timeout(Duration::from_secs(0));
        assert!(matches!(ctx.check(), Err(AppError::Canceled)));
    }
}
