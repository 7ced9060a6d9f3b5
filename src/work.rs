//! Shared atomic helpers for early-stop coordination and caller-driven cancellation.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Internal one-shot stop signal raised by the coordinator.
#[derive(Debug)]
pub struct StopFlag {
    stop: AtomicBool,
}

impl StopFlag {
    pub const fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn force_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

impl Default for StopFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle the caller keeps to abort a running search.
///
/// All clones share the same flag. Cancelling is sticky: a token stays
/// cancelled for every search it is handed to afterwards.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_flag_is_sticky() {
        let flag = StopFlag::new();
        assert!(!flag.should_stop());
        flag.force_stop();
        assert!(flag.should_stop());
        flag.force_stop();
        assert!(flag.should_stop());
    }

    #[test]
    fn cancel_token_clones_share_state() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }
}
